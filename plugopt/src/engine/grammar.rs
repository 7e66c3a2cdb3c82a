//! The narrow surface this crate needs from `clap`.
//!
//! Token classification and the unrecognized-token policy live in the engine;
//! `clap` validates, coerces and stores the recognised tokens.

use camino::Utf8PathBuf;
use clap::{
    Arg, ArgAction, ArgMatches, ColorChoice, Command, ValueHint,
    builder::{PossibleValuesParser, TypedValueParser, ValueParser},
    parser::ValueSource,
};

use crate::{OptionAction, OptionAttrs, OptionSpec, Value, ValueKind};

/// A `clap` command assembled one argument at a time.
#[derive(Debug, Clone)]
pub(crate) struct ClapGrammar {
    command: Command,
}

impl ClapGrammar {
    pub(crate) fn new(prog: &str, usage: &str) -> Self {
        let command = Command::new(prog.to_owned())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .args_override_self(true)
            .color(ColorChoice::Never)
            .override_usage(usage.to_owned());
        Self { command }
    }

    pub(crate) fn register_option(
        &mut self,
        id: &str,
        spec: &OptionSpec,
        attrs: &OptionAttrs,
        heading: &str,
    ) {
        let arg = option_arg(id, spec, attrs).help_heading(heading.to_owned());
        self.push(arg);
    }

    pub(crate) fn register_positional(&mut self, id: &str) {
        let arg = Arg::new(id.to_owned())
            .action(ArgAction::Append)
            .num_args(0..)
            .value_name(id.to_owned())
            .value_hint(ValueHint::AnyPath)
            .allow_negative_numbers(true);
        self.push(arg);
    }

    fn push(&mut self, arg: Arg) {
        let command = std::mem::take(&mut self.command);
        self.command = command.arg(arg);
    }

    pub(crate) fn parse(&self, tokens: &[String]) -> Result<ArgMatches, clap::Error> {
        self.command.clone().try_get_matches_from(tokens)
    }

    pub(crate) const fn command(&self) -> &Command {
        &self.command
    }
}

fn option_arg(id: &str, spec: &OptionSpec, attrs: &OptionAttrs) -> Arg {
    let mut arg = Arg::new(id.to_owned()).required(attrs.required).hide(attrs.hidden);

    let mut longs = spec
        .long_names()
        .iter()
        .filter_map(|name| name.strip_prefix("--"))
        .map(str::to_owned);
    if let Some(first) = longs.next() {
        arg = arg.long(first);
    }
    let long_aliases: Vec<String> = longs.collect();
    if !long_aliases.is_empty() {
        arg = arg.aliases(long_aliases);
    }

    let mut shorts = spec
        .short_names()
        .iter()
        .filter_map(|name| name.chars().nth(1));
    if let Some(first) = shorts.next() {
        arg = arg.short(first);
    }
    let short_aliases: Vec<char> = shorts.collect();
    if !short_aliases.is_empty() {
        arg = arg.short_aliases(short_aliases);
    }

    if let Some(help) = &attrs.help {
        arg = arg.help(help.clone());
    }

    match &attrs.action {
        OptionAction::Store | OptionAction::Append => {
            let action = if attrs.action == OptionAction::Append {
                ArgAction::Append
            } else {
                ArgAction::Set
            };
            let value_name = attrs
                .metavar
                .clone()
                .unwrap_or_else(|| spec.identifier().to_uppercase());
            arg.action(action)
                .num_args(1)
                .allow_negative_numbers(true)
                .value_name(value_name)
                .value_parser(value_parser(attrs))
        }
        OptionAction::StoreTrue | OptionAction::OverrideConfig { .. } => {
            arg.action(ArgAction::SetTrue)
        }
        OptionAction::StoreFalse => arg.action(ArgAction::SetFalse),
        OptionAction::Count => arg.action(ArgAction::Count),
    }
}

fn value_parser(attrs: &OptionAttrs) -> ValueParser {
    let kind = attrs.value_kind.unwrap_or_default();
    if attrs.choices.is_empty() {
        return match kind {
            ValueKind::String | ValueKind::Path => clap::value_parser!(String).into(),
            ValueKind::Int => clap::value_parser!(i64).into(),
            ValueKind::Float => clap::value_parser!(f64).into(),
        };
    }
    let choices = PossibleValuesParser::new(attrs.choices.clone());
    match kind {
        ValueKind::String | ValueKind::Path => choices.into(),
        ValueKind::Int => choices.try_map(|raw| raw.parse::<i64>()).into(),
        ValueKind::Float => choices.try_map(|raw| raw.parse::<f64>()).into(),
    }
}

/// Whether the argument was supplied on the command line rather than
/// defaulted by `clap`.
pub(crate) fn is_present(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Reads the typed value `clap` stored for a present option.
pub(crate) fn read_value(matches: &ArgMatches, id: &str, attrs: &OptionAttrs) -> Value {
    let kind = attrs.value_kind.unwrap_or_default();
    match &attrs.action {
        OptionAction::Store => read_one(matches, id, kind).unwrap_or(Value::None),
        OptionAction::Append => Value::List(read_many(matches, id, kind)),
        OptionAction::StoreTrue | OptionAction::OverrideConfig { .. } => Value::Bool(true),
        OptionAction::StoreFalse => Value::Bool(false),
        OptionAction::Count => Value::Int(i64::from(matches.get_count(id))),
    }
}

fn read_one(matches: &ArgMatches, id: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::String => one::<String>(matches, id).map(Value::Str),
        ValueKind::Path => {
            one::<String>(matches, id).map(|raw| Value::Path(Utf8PathBuf::from(raw)))
        }
        ValueKind::Int => one::<i64>(matches, id).map(Value::Int),
        ValueKind::Float => one::<f64>(matches, id).map(Value::Float),
    }
}

fn read_many(matches: &ArgMatches, id: &str, kind: ValueKind) -> Vec<Value> {
    match kind {
        ValueKind::String => many::<String>(matches, id).into_iter().map(Value::Str).collect(),
        ValueKind::Path => many::<String>(matches, id)
            .into_iter()
            .map(|raw| Value::Path(Utf8PathBuf::from(raw)))
            .collect(),
        ValueKind::Int => many::<i64>(matches, id).into_iter().map(Value::Int).collect(),
        ValueKind::Float => many::<f64>(matches, id).into_iter().map(Value::Float).collect(),
    }
}

fn one<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

fn many<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Vec<T> {
    matches
        .try_get_many::<T>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Extracts the message from a rendered `clap` error, dropping the `error: `
/// prefix and the usage tail.
pub(crate) fn clap_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let body = rendered.split("\n\n").next().unwrap_or_default().trim_end();
    body.strip_prefix("error: ").unwrap_or(body).to_owned()
}
