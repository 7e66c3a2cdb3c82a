//! Grouped help rendering.
//!
//! Long options that only differ in hyphenation (`--two-words` and
//! `--twowords`) are accepted on the command line but rendered once, using the
//! most hyphenated spelling. Help text is wrapped per paragraph so authors can
//! force line breaks.

mod terminal;
mod wrap;

pub use terminal::{FALLBACK_WIDTH, MIN_WIDTH, terminal_width};
pub use wrap::split_lines;

use std::collections::HashMap;

use crate::{ConfigKeyRegistry, OptionAttrs, OptionSpec, RegistrationError};

const INDENT: usize = 2;
const MAX_HELP_POSITION: usize = 24;
const MIN_HELP_WIDTH: usize = 11;

/// One entry as presented to the help formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpAction {
    key: String,
    names: Vec<String>,
    metavar: Option<String>,
    help: Option<String>,
}

impl HelpAction {
    /// Describes a flag-like option.
    ///
    /// `key` identifies the option for memoization, together with its raw
    /// invocation.
    #[must_use]
    pub fn option(key: impl Into<String>, spec: &OptionSpec, attrs: &OptionAttrs) -> Self {
        let metavar = attrs.action.takes_value().then(|| {
            attrs.metavar.clone().unwrap_or_else(|| {
                if attrs.choices.is_empty() {
                    spec.identifier().to_uppercase()
                } else {
                    format!("{{{}}}", attrs.choices.join(","))
                }
            })
        });
        Self {
            key: key.into(),
            names: spec.names().into_iter().map(str::to_owned).collect(),
            metavar,
            help: attrs.help.clone(),
        }
    }

    /// Describes a positional argument.
    #[must_use]
    pub fn positional(name: impl Into<String>, help: Option<String>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            names: vec![name],
            metavar: None,
            help,
        }
    }

    /// Invocation before deduplication: every name, each followed by the
    /// metavar when the option takes a value.
    #[must_use]
    pub fn raw_invocation(&self) -> String {
        self.names
            .iter()
            .map(|name| match &self.metavar {
                Some(metavar) => format!("{name} {metavar}"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Renders help text for a compiled grammar.
#[derive(Debug, Clone)]
pub struct HelpFormatter {
    width: usize,
    invocations: HashMap<(String, String), String>,
}

impl Default for HelpFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpFormatter {
    /// Creates a formatter sized to the current terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_width(terminal_width())
    }

    /// Creates a formatter wrapping at `width` columns.
    #[must_use]
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            invocations: HashMap::new(),
        }
    }

    /// The wrapping width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Renders the invocation column for `action`, dropping long spellings
    /// that only differ from a longer one by hyphenation.
    ///
    /// Results are memoized per action key and raw invocation, so an action
    /// that reuses a key with different names is formatted afresh.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::MissingLongPrefix`] when a multi-character
    /// alternative does not start with `--`.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{HelpAction, HelpFormatter, OptionAttrs, OptionSpec};
    ///
    /// let spec = OptionSpec::new(&["--two-words", "--twowords"], OptionAttrs::new())?;
    /// let action = HelpAction::option("--two-words", &spec, &spec.attrs());
    /// let mut formatter = HelpFormatter::with_width(80);
    /// assert_eq!(formatter.format_invocation(&action)?, "--two-words=TWO_WORDS");
    /// # Ok::<(), plugopt::RegistrationError>(())
    /// ```
    pub fn format_invocation(&mut self, action: &HelpAction) -> Result<String, RegistrationError> {
        let cache_key = (action.key.clone(), action.raw_invocation());
        if let Some(cached) = self.invocations.get(&cache_key) {
            return Ok(cached.clone());
        }
        let formatted = drop_shorter_long_spellings(&cache_key.1)?;
        self.invocations.insert(cache_key, formatted.clone());
        Ok(formatted)
    }

    /// Renders the complete help page.
    ///
    /// # Errors
    ///
    /// Propagates invocation formatting errors.
    pub fn format_help(
        &mut self,
        usage: &str,
        sections: &[(String, Vec<HelpAction>)],
        config_keys: &ConfigKeyRegistry,
    ) -> Result<String, RegistrationError> {
        let mut rendered: Vec<(String, Vec<(String, Option<String>)>)> = Vec::new();
        for (label, actions) in sections {
            let mut rows = Vec::with_capacity(actions.len());
            for action in actions {
                rows.push((self.format_invocation(action)?, action.help.clone()));
            }
            rendered.push((label.clone(), rows));
        }
        if !config_keys.is_empty() {
            let rows = config_keys
                .iter()
                .map(|(name, key)| {
                    let aliases: Vec<&str> = config_keys.aliases_of(name).collect();
                    let mut help = key.help.clone();
                    if !aliases.is_empty() {
                        help.push_str(&format!(" (aliases: {})", aliases.join(", ")));
                    }
                    (format!("{name} ({})", key.kind), Some(help))
                })
                .collect();
            rendered.push(("configuration keys".to_owned(), rows));
        }

        let widest = rendered
            .iter()
            .flat_map(|(_, rows)| rows.iter().map(|(invocation, _)| invocation.chars().count()))
            .max()
            .unwrap_or(0);
        let help_position = (widest + INDENT + 2).min(MAX_HELP_POSITION);

        let mut out = format!("{usage}\n");
        for (label, rows) in &rendered {
            out.push('\n');
            out.push_str(label);
            out.push_str(":\n");
            for (invocation, help) in rows {
                out.push_str(&self.format_row(invocation, help.as_deref(), help_position));
            }
        }
        Ok(out)
    }

    fn format_row(&self, invocation: &str, help: Option<&str>, help_position: usize) -> String {
        let action_width = help_position.saturating_sub(INDENT + 2);
        let help_width = self.width.saturating_sub(help_position).max(MIN_HELP_WIDTH);
        let lines = help.map(|text| split_lines(text, help_width)).unwrap_or_default();
        let pad = " ".repeat(INDENT);
        let mut lines = lines.into_iter();
        let mut row = match lines.next() {
            None => format!("{pad}{invocation}\n"),
            Some(first) if invocation.chars().count() <= action_width => {
                format!("{pad}{invocation:<action_width$}  {first}\n")
            }
            Some(first) => format!("{pad}{invocation}\n{}{first}\n", " ".repeat(help_position)),
        };
        for line in lines {
            row.push_str(&" ".repeat(help_position));
            row.push_str(&line);
            row.push('\n');
        }
        row
    }
}

fn is_short_alternative(option: &str) -> bool {
    let mut chars = option.chars();
    let prefix_len = chars.by_ref().take(2).count();
    match chars.next() {
        None => prefix_len == 2,
        Some(third) => third == ' ',
    }
}

fn drop_shorter_long_spellings(invocation: &str) -> Result<String, RegistrationError> {
    if !invocation.starts_with('-') {
        return Ok(invocation.to_owned());
    }
    let options: Vec<&str> = invocation.split(", ").collect();
    if options.len() == 2 && options.iter().any(|option| option.chars().count() == 2) {
        return Ok(invocation.to_owned());
    }

    let mut longest: HashMap<String, &str> = HashMap::new();
    for option in &options {
        if is_short_alternative(option) {
            continue;
        }
        let Some(spelling) = option.strip_prefix("--") else {
            return Err(RegistrationError::MissingLongPrefix((*option).to_owned()));
        };
        let collapsed = spelling.replace('-', "");
        let replace = longest
            .get(&collapsed)
            .is_none_or(|existing| existing.len() < spelling.len());
        if replace {
            longest.insert(collapsed, spelling);
        }
    }

    let kept: Vec<String> = options
        .iter()
        .filter_map(|option| {
            if is_short_alternative(option) {
                return Some((*option).to_owned());
            }
            let spelling = option.strip_prefix("--")?;
            (longest.get(&spelling.replace('-', "")) == Some(&spelling))
                .then(|| option.replacen(' ', "=", 1))
        })
        .collect();
    Ok(kept.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptionAction, ValueKind};
    use rstest::rstest;

    fn action(names: &[&str], attrs: OptionAttrs) -> HelpAction {
        let spec = OptionSpec::new(names, attrs).expect("valid option");
        let key = names.join("|");
        HelpAction::option(key, &spec, &spec.attrs())
    }

    #[rstest]
    #[case("file_or_dir", "file_or_dir")]
    #[case("-x, --exitfirst", "-x, --exitfirst")]
    #[case("-x", "-x")]
    #[case("--two-words VALUE, --twowords VALUE", "--two-words=VALUE")]
    #[case("--twowords VALUE, --two-words VALUE", "--two-words=VALUE")]
    #[case("-k EXPR, --keyword EXPR", "-k EXPR, --keyword=EXPR")]
    #[case("-f, --looponfail, --loop-on-fail", "-f, --loop-on-fail")]
    #[case("--ab-c, --a-bc", "--ab-c")]
    #[case("--single VALUE", "--single=VALUE")]
    fn deduplicates_hyphenation_variants(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(
            drop_shorter_long_spellings(raw).expect("formatted"),
            expected
        );
    }

    #[test]
    fn long_alternatives_need_double_dash() {
        let err = drop_shorter_long_spellings("-x, -long, --other").expect_err("bad label");
        assert_eq!(err, RegistrationError::MissingLongPrefix("-long".into()));
    }

    #[test]
    fn invocation_uses_identifier_metavar() {
        let two_words = action(&["--two-words", "--twowords"], OptionAttrs::new());
        assert_eq!(
            two_words.raw_invocation(),
            "--two-words TWO_WORDS, --twowords TWO_WORDS"
        );
        let mut formatter = HelpFormatter::with_width(80);
        assert_eq!(
            formatter.format_invocation(&two_words).expect("formatted"),
            "--two-words=TWO_WORDS"
        );
    }

    #[test]
    fn choices_become_metavar() {
        let choice = action(
            &["--tb"],
            OptionAttrs::new().choices(["auto", "long", "short"]),
        );
        assert_eq!(choice.raw_invocation(), "--tb {auto,long,short}");
    }

    #[test]
    fn flags_have_no_metavar() {
        let flag = action(
            &["-X", "--exit-first"],
            OptionAttrs::new().action(OptionAction::StoreTrue),
        );
        assert_eq!(flag.raw_invocation(), "-X, --exit-first");
    }

    #[test]
    fn invocations_are_memoized_per_key_and_spelling() {
        let mut formatter = HelpFormatter::with_width(80);
        let first = HelpAction::positional("shared", None);
        assert_eq!(formatter.format_invocation(&first).expect("formatted"), "shared");
        assert_eq!(formatter.format_invocation(&first).expect("cached"), "shared");
        assert_eq!(formatter.invocations.len(), 1);

        let mut renamed = action(&["--other"], OptionAttrs::new().action(OptionAction::Count));
        renamed.key = "shared".to_owned();
        assert_eq!(
            formatter.format_invocation(&renamed).expect("formatted"),
            "--other"
        );
        assert_eq!(formatter.invocations.len(), 2);
    }

    #[test]
    fn renders_sections_with_aligned_help() {
        let mut formatter = HelpFormatter::with_width(50);
        let sections = vec![
            (
                "positional arguments".to_owned(),
                vec![HelpAction::positional("file_or_dir", None)],
            ),
            (
                "general".to_owned(),
                vec![
                    action(
                        &["-Q", "--quiet"],
                        OptionAttrs::new()
                            .action(OptionAction::Count)
                            .help("decrease verbosity"),
                    ),
                    action(
                        &["--maxfail"],
                        OptionAttrs::new()
                            .value_kind(ValueKind::Int)
                            .metavar("num")
                            .help("exit after first num failures or errors.\nDefaults to never."),
                    ),
                ],
            ),
        ];
        let help = formatter
            .format_help("usage: prog [options]", &sections, &ConfigKeyRegistry::new())
            .expect("help");
        let expected = "\
usage: prog [options]

positional arguments:
  file_or_dir

general:
  -Q, --quiet    decrease verbosity
  --maxfail=num  exit after first num failures or
                 errors.
                 Defaults to never.
";
        assert_eq!(help, expected);
    }

    #[test]
    fn long_invocations_push_help_to_next_line() {
        let formatter = HelpFormatter::with_width(80);
        let row = formatter.format_row("--a-very-long-option-name=VALUE", Some("text"), 24);
        assert_eq!(row, format!("  --a-very-long-option-name=VALUE\n{}text\n", " ".repeat(24)));
    }
}
