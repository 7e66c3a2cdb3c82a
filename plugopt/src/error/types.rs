//! Registration-time failures and the umbrella error returned by parse entry
//! points.

use thiserror::Error;

use super::UsageError;

/// Mistakes made by plugin authors while declaring options or config keys.
///
/// These are programmer errors: callers are expected to surface them and
/// abort rather than recover.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    /// An option string does not follow the `-x` / `--xyz` conventions.
    #[error("option {option}: {message}")]
    InvalidOption {
        /// Names supplied for the offending option, joined with `/`.
        option: String,
        /// Description of the violated rule.
        message: String,
    },

    /// An option was declared without any usable name.
    #[error("need a long or short option")]
    MissingName,

    /// One or more names are already taken within the same group.
    #[error("option names {names} already added")]
    DuplicateNames {
        /// The colliding names, comma separated.
        names: String,
    },

    /// A plugin tried to claim a lowercase short option.
    #[error("lowercase short option {name} is reserved")]
    ReservedShortOption {
        /// The rejected short option string.
        name: String,
    },

    /// Two groups declare the same option string.
    #[error("conflicting option string: {name}")]
    ConflictingOption {
        /// The option string declared twice.
        name: String,
    },

    /// A config-key alias shadows a registered canonical key.
    #[error("alias '{alias}' conflicts with existing config key")]
    AliasShadowsKey {
        /// The rejected alias.
        alias: String,
    },

    /// A config-key alias already points at another canonical key.
    #[error("'{alias}' is already an alias of '{canonical}'")]
    AliasTaken {
        /// The rejected alias.
        alias: String,
        /// The canonical key the alias already resolves to.
        canonical: String,
    },

    /// A canonical config key reuses a name registered as an alias.
    #[error("config key '{name}' is already an alias of '{canonical}'")]
    KeyShadowsAlias {
        /// The rejected canonical name.
        name: String,
        /// The canonical key the alias resolves to.
        canonical: String,
    },

    /// A config-key type name outside the supported set.
    #[error("unknown config key type '{0}'")]
    UnknownKeyType(String),

    /// A long option label reached the help formatter without its `--`.
    #[error("long optional argument without \"--\": [{0}]")]
    MissingLongPrefix(String),
}

/// Errors returned by the parse entry points of
/// [`Registrar`](crate::Registrar).
///
/// Parsing compiles a fresh grammar, so it can fail either because the
/// registrations conflict or because the user supplied bad input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlugoptError {
    /// The registered options could not be compiled into a grammar.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// The command line was rejected.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl PlugoptError {
    /// Returns the usage error when the failure came from user input.
    #[must_use]
    pub const fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Self::Usage(err) => Some(err),
            Self::Registration(_) => None,
        }
    }
}
