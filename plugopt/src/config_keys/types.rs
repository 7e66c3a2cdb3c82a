//! Value types for configuration keys.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::RegistrationError;

/// The fixed set of configuration value types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConfigKeyType {
    /// A single string.
    #[default]
    String,
    /// Paths split shell-style, relative to the config file (`paths`).
    Paths,
    /// Paths split on whitespace, relative to the config file (`pathlist`).
    PathList,
    /// Arguments split shell-style (`args`).
    Args,
    /// One entry per non-empty line (`linelist`).
    LineList,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// A float.
    Float,
}

impl ConfigKeyType {
    /// Every supported type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Paths,
        Self::PathList,
        Self::Args,
        Self::LineList,
        Self::Bool,
        Self::Int,
        Self::Float,
    ];

    /// The name used in declarations and help output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Paths => "paths",
            Self::PathList => "pathlist",
            Self::Args => "args",
            Self::LineList => "linelist",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        }
    }

    /// Returns `true` for the list-valued types.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(
            self,
            Self::Paths | Self::PathList | Self::Args | Self::LineList
        )
    }

    /// The default used when a key is declared without one.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{ConfigKeyType, ConfigValue};
    ///
    /// assert_eq!(ConfigKeyType::LineList.implicit_default(), ConfigValue::List(vec![]));
    /// assert_eq!(ConfigKeyType::Bool.implicit_default(), ConfigValue::Bool(false));
    /// assert_eq!(ConfigKeyType::String.implicit_default(), ConfigValue::Str(String::new()));
    /// ```
    #[must_use]
    pub const fn implicit_default(self) -> ConfigValue {
        match self {
            Self::Paths | Self::PathList | Self::Args | Self::LineList => {
                ConfigValue::List(Vec::new())
            }
            Self::Bool => ConfigValue::Bool(false),
            Self::Int => ConfigValue::Int(0),
            Self::Float => ConfigValue::Float(0.0),
            Self::String => ConfigValue::Str(String::new()),
        }
    }
}

impl fmt::Display for ConfigKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKeyType {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RegistrationError::UnknownKeyType(s.to_owned()))
    }
}

/// A configuration value as declared in code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// An explicitly empty default.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// A list of strings.
    List(Vec<String>),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Whether a default was supplied.
///
/// Distinguishes "no default given" from an explicit [`ConfigValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    /// No default was supplied; the type's implicit default applies.
    #[default]
    Absent,
    /// An explicit default.
    Present(ConfigValue),
}

impl DefaultValue {
    /// The explicit default, or `kind`'s implicit default.
    #[must_use]
    pub fn resolve(self, kind: ConfigKeyType) -> ConfigValue {
        match self {
            Self::Absent => kind.implicit_default(),
            Self::Present(value) => value,
        }
    }
}
