//! Compilation of registered options into a parser, and parsing itself.
//!
//! A [`ParseEngine`] is built from a [`Registrar`](crate::Registrar) for each
//! parse call. Arguments pass through `@file` expansion, then a scan that
//! separates recognised options, positionals and leftovers. Only the
//! recognised options reach the `clap` grammar, which coerces and validates
//! them. Positionals go straight to `file_or_dir`.

mod argfile;
mod grammar;
mod scan;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use clap::{ArgMatches, Command};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ConfigKeyRegistry, FILE_OR_DIR, HelpAction, HelpFormatter, OVERRIDE_INI, OptionAction,
    OptionAttrs, OptionSink, OptionSpec, ParsedArgs, PathCompleter, Registrar, RegistrationError,
    UsageError, Value,
};

use grammar::ClapGrammar;
use scan::{Occurrence, OptionTable};

const POSITIONAL_SECTION: &str = "positional arguments";

#[derive(Debug, Clone)]
struct CompiledOption {
    id: String,
    spec: OptionSpec,
    attrs: OptionAttrs,
}

impl CompiledOption {
    fn identifier(&self) -> &str {
        self.spec.identifier()
    }
}

#[derive(Debug, Clone)]
struct Section {
    label: String,
    options: Vec<usize>,
}

/// A compiled grammar ready to parse argument vectors.
#[derive(Clone)]
pub struct ParseEngine {
    grammar: ClapGrammar,
    table: OptionTable,
    options: Vec<CompiledOption>,
    sections: Vec<Section>,
    usage: String,
    prog: String,
    hint: Option<String>,
    extra_info: BTreeMap<String, String>,
    completer: Arc<dyn PathCompleter>,
}

impl ParseEngine {
    /// Compiles every option registered with `registrar`.
    ///
    /// Named groups come first in their registration order, followed by the
    /// anonymous group; empty groups are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::ConflictingOption`] when two groups
    /// register the same option string.
    pub fn compile(registrar: &Registrar) -> Result<Self, RegistrationError> {
        let usage = registrar.usage_line();
        let prog = registrar.prog().to_owned();
        let mut grammar =
            ClapGrammar::new(&prog, usage.strip_prefix("usage: ").unwrap_or(&usage));
        let mut table = OptionTable::default();
        let mut options = Vec::new();
        let mut sections = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for group in registrar.populated_groups() {
            let mut section = Section {
                label: group.label().to_owned(),
                options: Vec::with_capacity(group.options().len()),
            };
            for spec in group.options() {
                let names = spec.names();
                if let Some(name) = names.iter().find(|name| !seen.insert((**name).to_owned())) {
                    return Err(RegistrationError::ConflictingOption {
                        name: (*name).to_owned(),
                    });
                }
                let Some(id) = names.first().map(|name| (*name).to_owned()) else {
                    continue;
                };
                let attrs = spec.attrs();
                let index = options.len();
                table.insert(index, &names, attrs.action.takes_value());
                grammar.register_option(&id, spec, &attrs, &section.label);
                section.options.push(index);
                options.push(CompiledOption {
                    id,
                    spec: spec.clone(),
                    attrs,
                });
            }
            sections.push(section);
        }
        grammar.register_positional(FILE_OR_DIR);
        debug!(
            options = options.len(),
            sections = sections.len(),
            "compiled option grammar"
        );

        Ok(Self {
            grammar,
            table,
            options,
            sections,
            usage,
            prog,
            hint: registrar.config_source_hint().map(str::to_owned),
            extra_info: registrar.extra_info().clone(),
            completer: registrar.path_completer(),
        })
    }

    /// The `usage:` line shown above errors and help.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The program name used in error messages.
    #[must_use]
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// The underlying `clap` command, for shell-completion generators.
    #[must_use]
    pub const fn command(&self) -> &Command {
        self.grammar.command()
    }

    /// The completer offered for the `file_or_dir` positional.
    #[must_use]
    pub fn path_completer(&self) -> &dyn PathCompleter {
        self.completer.as_ref()
    }

    /// Help entries grouped by section, hidden options omitted.
    #[must_use]
    pub fn help_sections(&self) -> Vec<(String, Vec<HelpAction>)> {
        let mut sections = vec![(
            POSITIONAL_SECTION.to_owned(),
            vec![HelpAction::positional(FILE_OR_DIR, None)],
        )];
        for section in &self.sections {
            let actions = section
                .options
                .iter()
                .filter_map(|&index| self.options.get(index))
                .filter(|option| !option.attrs.hidden)
                .map(|option| HelpAction::option(&option.id, &option.spec, &option.attrs))
                .collect();
            sections.push((section.label.clone(), actions));
        }
        sections
    }

    /// Renders the help page with `formatter`, listing `config_keys` last.
    ///
    /// # Errors
    ///
    /// Propagates invocation formatting errors.
    pub fn format_help(
        &self,
        formatter: &mut HelpFormatter,
        config_keys: &ConfigKeyRegistry,
    ) -> Result<String, RegistrationError> {
        formatter.format_help(&self.usage, &self.help_sections(), config_keys)
    }

    /// Parses `args`, returning the recognised result and every leftover
    /// token in order.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] when an argument file cannot be read or when
    /// the recognised tokens violate the grammar.
    pub fn parse_known_and_unknown_args<I, S>(
        &self,
        args: I,
    ) -> Result<(ParsedArgs, Vec<String>), UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = argfile::expand(args.into_iter().map(Into::into).collect())
            .map_err(|message| self.usage_error(&message))?;
        let scan = self.table.scan(args);
        let matches = self
            .grammar
            .parse(&scan.options)
            .map_err(|err| self.usage_error(&grammar::clap_message(&err)))?;
        let values = self.collect_values(&matches, &scan.occurrences);
        Ok((ParsedArgs::new(values, scan.positionals), scan.unknown))
    }

    /// Parses `args`, discarding leftover tokens.
    ///
    /// # Errors
    ///
    /// See [`ParseEngine::parse_known_and_unknown_args`].
    pub fn parse_known_args<I, S>(&self, args: I) -> Result<ParsedArgs, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_known_and_unknown_args(args)
            .map(|(parsed, _)| parsed)
    }

    /// Parses `args`, rejecting unrecognised option-like tokens.
    ///
    /// Leftovers that do not start with `-` are appended to `file_or_dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] listing every leftover, followed by the
    /// registrar's extra diagnostics, when any leftover starts with `-`.
    /// Grammar violations are reported as in
    /// [`ParseEngine::parse_known_and_unknown_args`].
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedArgs, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (mut parsed, leftovers) = self.parse_known_and_unknown_args(args)?;
        if leftovers.iter().any(|token| token.starts_with('-')) {
            let mut lines = vec![format!("unrecognized arguments: {}", leftovers.join(" "))];
            lines.extend(
                self.extra_info
                    .iter()
                    .map(|(key, value)| format!("  {key}: {value}")),
            );
            return Err(self.usage_error(&lines.join("\n")));
        }
        parsed.extend_file_or_dir(leftovers);
        Ok(parsed)
    }

    /// Parses `args`, hands every value to `sink` and returns the
    /// `file_or_dir` list.
    ///
    /// # Errors
    ///
    /// See [`ParseEngine::parse`]. The sink is untouched on failure.
    pub fn parse_and_apply<I, S, K>(&self, args: I, sink: &mut K) -> Result<Vec<String>, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        K: OptionSink + ?Sized,
    {
        Ok(self.parse(args)?.apply_to(sink))
    }

    fn usage_error(&self, message: &str) -> UsageError {
        UsageError::new(&self.usage, &self.prog, message, self.hint.as_deref())
    }

    fn collect_values(
        &self,
        matches: &ArgMatches,
        occurrences: &[Occurrence],
    ) -> IndexMap<String, Value> {
        let mut values: IndexMap<String, Value> = IndexMap::new();
        let mut latest: HashMap<&str, usize> = HashMap::new();
        for (index, option) in self.options.iter().enumerate() {
            let identifier = option.identifier();
            if grammar::is_present(matches, &option.id) {
                let position = occurrences
                    .iter()
                    .rposition(|occurrence| occurrence.option == index)
                    .unwrap_or_default();
                if latest.get(identifier).is_none_or(|seen| *seen <= position) {
                    let value = grammar::read_value(matches, &option.id, &option.attrs);
                    values.insert(identifier.to_owned(), value);
                    latest.insert(identifier, position);
                }
            } else if !values.contains_key(identifier) {
                let default = option
                    .attrs
                    .default
                    .clone()
                    .unwrap_or_else(|| option.attrs.action.implicit_default());
                values.insert(identifier.to_owned(), default);
            }
        }
        if let Some(overrides) = self.collect_overrides(occurrences) {
            values.insert(OVERRIDE_INI.to_owned(), Value::str_list(overrides));
        }
        values
    }

    /// Builds the ordered `override_ini` list when at least one override flag
    /// was activated.
    fn collect_overrides(&self, occurrences: &[Occurrence]) -> Option<Vec<String>> {
        let mut flagged = false;
        let mut overrides = Vec::new();
        for occurrence in occurrences {
            let Some(option) = self.options.get(occurrence.option) else {
                continue;
            };
            if let OptionAction::OverrideConfig { key, value } = &option.attrs.action {
                flagged = true;
                overrides.push(format!("{key}={value}"));
            } else if option.identifier() == OVERRIDE_INI
                && let Some(value) = &occurrence.value
            {
                overrides.push(value.clone());
            }
        }
        flagged.then_some(overrides)
    }
}

impl fmt::Debug for ParseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseEngine")
            .field("prog", &self.prog)
            .field("usage", &self.usage)
            .field("options", &self.options)
            .field("sections", &self.sections)
            .field("hint", &self.hint)
            .field("extra_info", &self.extra_info)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
