//! Splits argv into option tokens, positional tokens and leftovers.
//!
//! Only option tokens reach `clap`, and each is rewritten with its value
//! attached (`--name=value`, `-k=value`) so `clap` never re-classifies a
//! value or a positional that merely looks like a flag. The scan also records
//! each option occurrence in order, which `clap` does not expose for repeated
//! flags.

use std::collections::HashMap;

/// One activation of a registered option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence {
    /// Index of the option in compilation order.
    pub(crate) option: usize,
    /// The value consumed by the option, when it takes one.
    pub(crate) value: Option<String>,
}

/// The outcome of [`OptionTable::scan`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Scan {
    /// Recognised options in canonical, value-attached form.
    pub(crate) options: Vec<String>,
    /// Tokens for the catch-all positional.
    pub(crate) positionals: Vec<String>,
    pub(crate) unknown: Vec<String>,
    pub(crate) occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Spelling {
    Long(String),
    Short(char),
}

impl Spelling {
    fn token(&self, value: Option<&str>) -> String {
        match (self, value) {
            (Self::Long(name), None) => format!("--{name}"),
            (Self::Long(name), Some(value)) => format!("--{name}={value}"),
            (Self::Short(flag), None) => format!("-{flag}"),
            (Self::Short(flag), Some(value)) => format!("-{flag}={value}"),
        }
    }
}

/// Lookup tables over every registered option string.
#[derive(Debug, Clone, Default)]
pub(crate) struct OptionTable {
    longs: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
    takes_value: Vec<bool>,
    numeric_options: bool,
}

impl OptionTable {
    /// Registers the names of the option at index `option`.
    pub(crate) fn insert(&mut self, option: usize, names: &[&str], takes_value: bool) {
        for name in names {
            if let Some(long) = name.strip_prefix("--") {
                self.longs.insert(long.to_owned(), option);
            } else if let Some(short) = name.strip_prefix('-').and_then(|rest| rest.chars().next())
            {
                self.shorts.insert(short, option);
            }
            if is_negative_number(name) {
                self.numeric_options = true;
            }
        }
        if self.takes_value.len() <= option {
            self.takes_value.resize(option + 1, false);
        }
        if let Some(slot) = self.takes_value.get_mut(option) {
            *slot = takes_value;
        }
    }

    fn takes_value(&self, option: usize) -> bool {
        self.takes_value.get(option).copied().unwrap_or(false)
    }

    fn is_flag_like(&self, token: &str) -> bool {
        token.starts_with('-')
            && token != "-"
            && (self.numeric_options || !is_negative_number(token))
    }

    /// Classifies `args`, keeping token order within each kind.
    pub(crate) fn scan(&self, args: Vec<String>) -> Scan {
        let mut scan = Scan::default();
        let mut tokens = args.into_iter().peekable();
        while let Some(token) = tokens.next() {
            if token == "--" {
                scan.positionals.extend(tokens);
                break;
            }
            if !self.is_flag_like(&token) {
                scan.positionals.push(token);
                continue;
            }
            let Some(mut matched) = self.match_token(&token) else {
                scan.unknown.push(token);
                continue;
            };
            if let Some((_, last)) = matched.last_mut()
                && last.value.is_none()
                && self.takes_value(last.option)
                && let Some(next) = tokens.next_if(|next| !self.is_flag_like(next))
            {
                last.value = Some(next);
            }
            for (spelling, occurrence) in matched {
                scan.options.push(spelling.token(occurrence.value.as_deref()));
                scan.occurrences.push(occurrence);
            }
        }
        scan
    }

    fn match_token(&self, token: &str) -> Option<Vec<(Spelling, Occurrence)>> {
        if let Some(body) = token.strip_prefix("--") {
            self.match_long(body).map(|matched| vec![matched])
        } else {
            self.match_short_cluster(token.get(1..)?)
        }
    }

    fn match_long(&self, body: &str) -> Option<(Spelling, Occurrence)> {
        let (name, value) = body
            .split_once('=')
            .map_or((body, None), |(name, value)| (name, Some(value.to_owned())));
        let &option = self.longs.get(name)?;
        Some((
            Spelling::Long(name.to_owned()),
            Occurrence { option, value },
        ))
    }

    fn match_short_cluster(&self, body: &str) -> Option<Vec<(Spelling, Occurrence)>> {
        let mut matched = Vec::new();
        for (offset, flag) in body.char_indices() {
            let &option = self.shorts.get(&flag)?;
            if self.takes_value(option) {
                let attached = body.get(offset + flag.len_utf8()..).unwrap_or_default();
                let text = attached.strip_prefix('=').unwrap_or(attached);
                let value = (!text.is_empty()).then(|| text.to_owned());
                matched.push((Spelling::Short(flag), Occurrence { option, value }));
                return Some(matched);
            }
            matched.push((
                Spelling::Short(flag),
                Occurrence {
                    option,
                    value: None,
                },
            ));
        }
        Some(matched)
    }
}

/// Matches `-5`, `-12` and `-.5` style tokens.
pub(crate) fn is_negative_number(token: &str) -> bool {
    let Some(number) = token.strip_prefix('-') else {
        return false;
    };
    let all_digits = |text: &str| text.chars().all(|c| c.is_ascii_digit());
    number.split_once('.').map_or_else(
        || !number.is_empty() && all_digits(number),
        |(whole, fraction)| all_digits(whole) && !fraction.is_empty() && all_digits(fraction),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn owned(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| (*token).to_owned()).collect()
    }

    #[fixture]
    fn table() -> OptionTable {
        let mut table = OptionTable::default();
        table.insert(0, &["-v", "--verbose"], false);
        table.insert(1, &["-k"], true);
        table.insert(2, &["--maxfail"], true);
        table.insert(3, &["-x"], false);
        table
    }

    #[rstest]
    #[case("-5", true)]
    #[case("-12", true)]
    #[case("-.5", true)]
    #[case("-1.5", true)]
    #[case("-", false)]
    #[case("-1.", false)]
    #[case("-x", false)]
    #[case("5", false)]
    fn negative_numbers(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(is_negative_number(token), expected);
    }

    #[rstest]
    fn unknown_options_become_leftovers(table: OptionTable) {
        let scan = table.scan(owned(&["--unknown-flag", "file.py", "-v"]));
        assert_eq!(scan.options, ["-v"]);
        assert_eq!(scan.positionals, ["file.py"]);
        assert_eq!(scan.unknown, ["--unknown-flag"]);
        assert_eq!(scan.occurrences, [Occurrence { option: 0, value: None }]);
    }

    #[rstest]
    fn consumed_values_are_attached(table: OptionTable) {
        let scan = table.scan(owned(&["--maxfail", "3", "-k", "slow", "a.py"]));
        assert_eq!(scan.options, ["--maxfail=3", "-k=slow"]);
        assert_eq!(scan.positionals, ["a.py"]);
        assert_eq!(
            scan.occurrences,
            [
                Occurrence { option: 2, value: Some("3".into()) },
                Occurrence { option: 1, value: Some("slow".into()) },
            ]
        );
    }

    #[rstest]
    #[case(&["--maxfail=-2"], Some("-2"), "--maxfail=-2")]
    #[case(&["--maxfail", "-2"], Some("-2"), "--maxfail=-2")]
    #[case(&["--maxfail", "-.5"], Some("-.5"), "--maxfail=-.5")]
    #[case(&["-k", "-.5"], Some("-.5"), "-k=-.5")]
    #[case(&["-k=", "a.py"], None, "-k")]
    #[case(&["--maxfail", "--verbose"], None, "--maxfail")]
    fn value_forms(
        table: OptionTable,
        #[case] tokens: &[&str],
        #[case] value: Option<&str>,
        #[case] canonical: &str,
    ) {
        let scan = table.scan(owned(tokens));
        assert_eq!(
            scan.occurrences.first().and_then(|occurrence| occurrence.value.as_deref()),
            value
        );
        assert_eq!(scan.options.first().map(String::as_str), Some(canonical));
    }

    #[rstest]
    fn short_clusters_are_split(table: OptionTable) {
        let scan = table.scan(owned(&["-vxkfoo"]));
        assert!(scan.unknown.is_empty());
        assert_eq!(scan.options, ["-v", "-x", "-k=foo"]);
        assert_eq!(
            scan.occurrences,
            [
                Occurrence { option: 0, value: None },
                Occurrence { option: 3, value: None },
                Occurrence { option: 1, value: Some("foo".into()) },
            ]
        );
    }

    #[rstest]
    fn clusters_with_unknown_letters_are_left_over(table: OptionTable) {
        let scan = table.scan(owned(&["-vq"]));
        assert_eq!(scan.unknown, ["-vq"]);
        assert!(scan.occurrences.is_empty());
    }

    #[rstest]
    fn terminator_passes_the_rest_through(table: OptionTable) {
        let scan = table.scan(owned(&["-v", "--", "--unknown", "-x"]));
        assert_eq!(scan.options, ["-v"]);
        assert_eq!(scan.positionals, ["--unknown", "-x"]);
        assert!(scan.unknown.is_empty());
    }

    #[rstest]
    fn negative_numbers_are_positional(table: OptionTable) {
        let scan = table.scan(owned(&["-.5", "-3"]));
        assert_eq!(scan.positionals, ["-.5", "-3"]);
        assert!(scan.options.is_empty());
    }

    #[rstest]
    fn abbreviations_are_not_expanded(table: OptionTable) {
        let scan = table.scan(owned(&["--verb"]));
        assert_eq!(scan.unknown, ["--verb"]);
    }

    #[test]
    fn numeric_option_names_make_negative_numbers_flags() {
        let mut table = OptionTable::default();
        table.insert(0, &["-1"], false);
        let scan = table.scan(owned(&["-1", "-5"]));
        assert_eq!(scan.options, ["-1"]);
        assert_eq!(scan.unknown, ["-5"]);
    }
}
