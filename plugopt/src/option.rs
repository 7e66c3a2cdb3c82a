//! Declarations for individual command-line options.
//!
//! An [`OptionSpec`] validates its option strings on construction and derives
//! the identifier under which its parsed value is stored. Everything else the
//! grammar compiler needs travels in an [`OptionAttrs`] bag.

use std::collections::BTreeMap;

use crate::{RegistrationError, Value};

/// What happens when an option is encountered on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionAction {
    /// Consume one value and store it; the last occurrence wins.
    #[default]
    Store,
    /// Store `true` when present.
    StoreTrue,
    /// Store `false` when present.
    StoreFalse,
    /// Consume one value per occurrence and collect them in order.
    Append,
    /// Count occurrences.
    Count,
    /// Presence flag that also appends `"{key}={value}"` to the
    /// `override_ini` list.
    OverrideConfig {
        /// Config key being overridden.
        key: String,
        /// Value assigned to the key.
        value: String,
    },
}

impl OptionAction {
    /// Returns `true` when the option consumes a value.
    #[must_use]
    pub const fn takes_value(&self) -> bool {
        matches!(self, Self::Store | Self::Append)
    }

    /// The value an absent option receives when no default was declared.
    #[must_use]
    pub const fn implicit_default(&self) -> Value {
        match self {
            Self::StoreTrue => Value::Bool(false),
            Self::StoreFalse => Value::Bool(true),
            Self::Count => Value::Int(0),
            Self::Store | Self::Append | Self::OverrideConfig { .. } => Value::None,
        }
    }
}

/// Coercion applied to option values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueKind {
    /// Keep the raw text.
    #[default]
    String,
    /// Parse as a signed integer.
    Int,
    /// Parse as a float.
    Float,
    /// Keep the raw text as a UTF-8 path.
    Path,
}

/// Attribute bag accompanying an option declaration.
///
/// # Examples
///
/// ```
/// use plugopt::{OptionAction, OptionAttrs, ValueKind};
///
/// let attrs = OptionAttrs::new()
///     .action(OptionAction::Store)
///     .value_kind(ValueKind::Int)
///     .metavar("N")
///     .help("stop after N failures");
/// assert_eq!(attrs.metavar.as_deref(), Some("N"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionAttrs {
    /// Behaviour on the command line.
    pub action: OptionAction,
    /// Value coercion for value-taking actions.
    pub value_kind: Option<ValueKind>,
    /// Value stored when the option is absent.
    pub default: Option<Value>,
    /// Help text; may contain explicit newlines.
    pub help: Option<String>,
    /// Explicit identifier overriding the derived one.
    pub dest: Option<String>,
    /// Placeholder shown in help for the option's value.
    pub metavar: Option<String>,
    /// Accepted values; empty means unrestricted.
    pub choices: Vec<String>,
    /// Whether the option must appear on the command line.
    pub required: bool,
    /// Whether the option is left out of rendered help.
    pub hidden: bool,
    /// Opaque attributes carried through to collaborators.
    pub extra: BTreeMap<String, String>,
}

impl OptionAttrs {
    /// Creates an empty attribute bag describing a value-storing option.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the action.
    #[must_use]
    pub fn action(mut self, action: OptionAction) -> Self {
        self.action = action;
        self
    }

    /// Sets the value coercion.
    #[must_use]
    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Overrides the derived identifier.
    #[must_use]
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Sets the help placeholder.
    #[must_use]
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    /// Restricts accepted values.
    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the option as mandatory.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hides the option from help output.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds an opaque passthrough attribute.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A validated command-line option declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    short_names: Vec<String>,
    long_names: Vec<String>,
    identifier: String,
    default: Option<Value>,
    help: Option<String>,
    attrs: OptionAttrs,
}

impl OptionSpec {
    /// Validates `names` and derives the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidOption`] when a name is shorter
    /// than two characters or does not follow the `-x` / `--xyz` shapes, and
    /// [`RegistrationError::MissingName`] when no name was supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{OptionAttrs, OptionSpec};
    ///
    /// let spec = OptionSpec::new(&["-k", "--keyword-expr"], OptionAttrs::new())?;
    /// assert_eq!(spec.identifier(), "keyword_expr");
    /// # Ok::<(), plugopt::RegistrationError>(())
    /// ```
    pub fn new(names: &[&str], attrs: OptionAttrs) -> Result<Self, RegistrationError> {
        let mut short_names = Vec::new();
        let mut long_names = Vec::new();
        for name in names {
            match classify_name(name) {
                Ok(NameForm::Short) => short_names.push((*name).to_owned()),
                Ok(NameForm::Long) => long_names.push((*name).to_owned()),
                Err(message) => {
                    return Err(RegistrationError::InvalidOption {
                        option: names.join("/"),
                        message,
                    });
                }
            }
        }
        let identifier = derive_identifier(attrs.dest.as_deref(), &short_names, &long_names)?;
        Ok(Self {
            short_names,
            long_names,
            identifier,
            default: attrs.default.clone(),
            help: attrs.help.clone(),
            attrs,
        })
    }

    /// All option strings, short forms first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.short_names
            .iter()
            .chain(&self.long_names)
            .map(String::as_str)
            .collect()
    }

    /// Short forms such as `-x`, in declaration order.
    #[must_use]
    pub fn short_names(&self) -> &[String] {
        &self.short_names
    }

    /// Long forms such as `--xyz`, in declaration order.
    #[must_use]
    pub fn long_names(&self) -> &[String] {
        &self.long_names
    }

    /// Key under which the parsed value is stored.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Declared default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Help text, if any.
    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The option's action.
    #[must_use]
    pub const fn action(&self) -> &OptionAction {
        &self.attrs.action
    }

    /// Replaces the identifier.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    /// Replaces the default value.
    pub fn set_default(&mut self, value: Option<Value>) {
        self.default = value;
    }

    /// Replaces the help text.
    pub fn set_help(&mut self, help: Option<String>) {
        self.help = help;
    }

    /// Attributes handed to the grammar compiler.
    ///
    /// `default`, `dest` and `help` are taken from the spec's current fields
    /// so mutations made by a processing hook after construction are honoured.
    #[must_use]
    pub fn attrs(&self) -> OptionAttrs {
        OptionAttrs {
            default: self.default.clone(),
            dest: Some(self.identifier.clone()),
            help: self.help.clone(),
            ..self.attrs.clone()
        }
    }
}

enum NameForm {
    Short,
    Long,
}

fn classify_name(name: &str) -> Result<NameForm, String> {
    let mut chars = name.chars();
    let first = chars.next();
    let second = chars.next();
    let third = chars.next();
    match (first, second, third) {
        (_, None, _) => Err(format!(
            "invalid option string {name:?}: must be at least two characters long"
        )),
        (Some('-'), Some(flag), None) if flag != '-' => Ok(NameForm::Short),
        (_, Some(_), None) => Err(format!(
            "invalid short option string {name:?}: must be of the form -x, (x any non-dash char)"
        )),
        (Some('-'), Some('-'), Some(flag)) if flag != '-' => Ok(NameForm::Long),
        _ => Err(format!(
            "invalid long option string {name:?}: must start with --, followed by non-dash"
        )),
    }
}

fn derive_identifier(
    explicit: Option<&str>,
    short_names: &[String],
    long_names: &[String],
) -> Result<String, RegistrationError> {
    if let Some(dest) = explicit.filter(|dest| !dest.is_empty()) {
        return Ok(dest.to_owned());
    }
    if let Some(long) = long_names.first().and_then(|name| name.strip_prefix("--")) {
        return Ok(long.replace('-', "_"));
    }
    short_names
        .first()
        .and_then(|name| name.strip_prefix('-'))
        .map(str::to_owned)
        .ok_or(RegistrationError::MissingName)
}
