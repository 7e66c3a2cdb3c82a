//! Typed parse results.
//!
//! Parsing produces a [`ParsedArgs`] record mapping option identifiers to
//! [`Value`]s plus the catch-all `file_or_dir` list. Collaborators either read
//! it directly, stream it into their own structures through [`OptionSink`],
//! or convert it into JSON for a serde/figment merge.

use std::collections::{BTreeMap, HashMap};

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Identifier of the trailing catch-all positional.
pub const FILE_OR_DIR: &str = "file_or_dir";

/// Identifier of the accumulated config-key overrides.
pub const OVERRIDE_INI: &str = "override_ini";

/// A single parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The option was absent and had no default.
    None,
    /// Presence flags and explicit booleans.
    Bool(bool),
    /// Integers and occurrence counts.
    Int(i64),
    /// Floating point numbers.
    Float(f64),
    /// Free-form text.
    Str(String),
    /// Filesystem paths.
    Path(Utf8PathBuf),
    /// Values collected by repeatable options.
    List(Vec<Self>),
}

impl Value {
    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the textual payload of strings and paths.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            Self::Path(path) => Some(path.as_str()),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Builds a list of strings.
    #[must_use]
    pub fn str_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|item| Self::Str(item.into())).collect())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Utf8PathBuf> for Value {
    fn from(value: Utf8PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::None => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Int(number) => Self::from(*number),
            Value::Float(number) => Self::from(*number),
            Value::Str(text) => Self::String(text.clone()),
            Value::Path(path) => Self::String(path.to_string()),
            Value::List(items) => Self::Array(items.iter().map(Self::from).collect()),
        }
    }
}

/// Receives parsed values on behalf of a collaborator.
///
/// This replaces attribute copying onto an arbitrary result object: the
/// engine hands over one `(identifier, value)` pair per recognised option plus
/// the catch-all list under [`FILE_OR_DIR`].
pub trait OptionSink {
    /// Stores `value` under `identifier`, replacing any previous value.
    fn set_option(&mut self, identifier: &str, value: Value);
}

impl OptionSink for BTreeMap<String, Value> {
    fn set_option(&mut self, identifier: &str, value: Value) {
        self.insert(identifier.to_owned(), value);
    }
}

impl<S: std::hash::BuildHasher> OptionSink for HashMap<String, Value, S> {
    fn set_option(&mut self, identifier: &str, value: Value) {
        self.insert(identifier.to_owned(), value);
    }
}

impl<S: std::hash::BuildHasher> OptionSink for IndexMap<String, Value, S> {
    fn set_option(&mut self, identifier: &str, value: Value) {
        self.insert(identifier.to_owned(), value);
    }
}

/// The outcome of a successful parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    values: IndexMap<String, Value>,
    file_or_dir: Vec<String>,
}

impl ParsedArgs {
    pub(crate) fn new(values: IndexMap<String, Value>, file_or_dir: Vec<String>) -> Self {
        Self {
            values,
            file_or_dir,
        }
    }

    /// Looks up the value stored under `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Value> {
        self.values.get(identifier)
    }

    /// Returns `true` when `identifier` received a value or a default.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.values.contains_key(identifier)
    }

    /// Iterates over option values in grammar order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The catch-all positional tokens.
    #[must_use]
    pub fn file_or_dir(&self) -> &[String] {
        &self.file_or_dir
    }

    pub(crate) fn extend_file_or_dir<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.file_or_dir.extend(tokens);
    }

    /// Flattens the record into `(identifier, value)` pairs.
    ///
    /// Option values come first in grammar order, followed by the catch-all
    /// list under [`FILE_OR_DIR`].
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        let mut pairs: Vec<(String, Value)> = self.values.into_iter().collect();
        pairs.push((
            FILE_OR_DIR.to_owned(),
            Value::str_list(self.file_or_dir),
        ));
        pairs
    }

    /// Applies every pair to `sink` and returns the catch-all list.
    pub fn apply_to<S: OptionSink + ?Sized>(self, sink: &mut S) -> Vec<String> {
        let file_or_dir = self.file_or_dir.clone();
        for (identifier, value) in self.into_pairs() {
            sink.set_option(&identifier, value);
        }
        file_or_dir
    }

    /// Renders the record as a JSON object, suitable as a CLI layer for
    /// serde-based configuration merges.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut object = serde_json::Map::new();
        for (identifier, value) in &self.values {
            object.insert(identifier.clone(), JsonValue::from(value));
        }
        object.insert(
            FILE_OR_DIR.to_owned(),
            JsonValue::Array(
                self.file_or_dir
                    .iter()
                    .cloned()
                    .map(JsonValue::String)
                    .collect(),
            ),
        );
        JsonValue::Object(object)
    }
}
