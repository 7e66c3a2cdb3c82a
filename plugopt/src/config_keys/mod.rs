//! Registry of persisted configuration keys.
//!
//! Keys are declared with help text, a [`ConfigKeyType`] and a default.
//! Aliases resolve to canonical keys at lookup time. Reading configuration
//! files and coercing raw values is left to collaborators; the registry
//! exposes defaults to them through its `figment` provider.

mod provider;
mod types;

pub use types::{ConfigKeyType, ConfigValue, DefaultValue};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::RegistrationError;

/// A declared configuration key.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigKey {
    /// Help text.
    pub help: String,
    /// Value type.
    pub kind: ConfigKeyType,
    /// Resolved default value.
    pub default: ConfigValue,
}

/// Declaration of a configuration key, passed to
/// [`Registrar::add_config_key`](crate::Registrar::add_config_key).
///
/// # Examples
///
/// ```
/// use plugopt::{ConfigKeyDecl, ConfigKeyType};
///
/// let decl = ConfigKeyDecl::new("timeout", "per-test timeout in seconds")
///     .kind(ConfigKeyType::Float)
///     .aliases(["slow_timeout"]);
/// assert_eq!(decl.name(), "timeout");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigKeyDecl {
    name: String,
    help: String,
    kind: Option<ConfigKeyType>,
    default: DefaultValue,
    aliases: Vec<String>,
}

impl ConfigKeyDecl {
    /// Declares a string key with no explicit default and no aliases.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: None,
            default: DefaultValue::Absent,
            aliases: Vec::new(),
        }
    }

    /// Sets the value type.
    #[must_use]
    pub const fn kind(mut self, kind: ConfigKeyType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets an explicit default, which may be [`ConfigValue::Null`].
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default = DefaultValue::Present(value.into());
        self
    }

    /// Sets alternative names resolving to this key.
    #[must_use]
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// The canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Name → declaration map plus alias table.
#[derive(Debug, Clone, Default)]
pub struct ConfigKeyRegistry {
    keys: IndexMap<String, ConfigKey>,
    aliases: IndexMap<String, String>,
}

impl ConfigKeyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key and its aliases.
    ///
    /// The declaration is validated as a whole before anything is stored.
    /// Declaring an existing canonical name again replaces its entry.
    ///
    /// # Errors
    ///
    /// Fails when the name is already an alias, when an alias names a
    /// canonical key, or when an alias already points at another key.
    pub fn register(&mut self, decl: ConfigKeyDecl) -> Result<(), RegistrationError> {
        let ConfigKeyDecl {
            name,
            help,
            kind,
            default,
            aliases,
        } = decl;
        if let Some(canonical) = self.aliases.get(&name) {
            return Err(RegistrationError::KeyShadowsAlias {
                name,
                canonical: canonical.clone(),
            });
        }
        for alias in &aliases {
            if *alias == name || self.keys.contains_key(alias) {
                return Err(RegistrationError::AliasShadowsKey {
                    alias: alias.clone(),
                });
            }
            if let Some(already) = self.aliases.get(alias)
                && *already != name
            {
                return Err(RegistrationError::AliasTaken {
                    alias: alias.clone(),
                    canonical: already.clone(),
                });
            }
        }

        let kind = kind.unwrap_or_default();
        let default = default.resolve(kind);
        if self.keys.contains_key(&name) {
            warn!(key = %name, "config key registered again; replacing previous declaration");
        }
        debug!(key = %name, kind = %kind, aliases = aliases.len(), "registered config key");
        for alias in aliases {
            self.aliases.insert(alias, name.clone());
        }
        self.keys.insert(
            name,
            ConfigKey {
                help,
                kind,
                default,
            },
        );
        Ok(())
    }

    /// Resolves `name` through the alias table to its canonical name.
    #[must_use]
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.keys.get_key_value(name) {
            return Some(canonical);
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Looks up a key by canonical name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfigKey> {
        self.canonical_name(name)
            .and_then(|canonical| self.keys.get(canonical))
    }

    /// Returns `true` when `name` is a canonical key or an alias.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Aliases pointing at `canonical`, in registration order.
    pub fn aliases_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, target)| target.as_str() == canonical)
            .map(|(alias, _)| alias.as_str())
    }

    /// Canonical keys in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigKey)> {
        self.keys.iter().map(|(name, key)| (name.as_str(), key))
    }

    /// Number of canonical keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when no key was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
