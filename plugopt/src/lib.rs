//! Option and configuration-key registration for plugin-driven test runners.
//!
//! Plugins describe command-line options through a [`Registrar`], either in
//! the anonymous "Custom options" group or in named [`OptionGroup`]s, and
//! declare typed configuration keys with [`ConfigKeyDecl`]. Each parse
//! compiles the registrations into a [`ParseEngine`], which recognises the
//! registered options, routes unknown positional tokens into the catch-all
//! `file_or_dir` list and rejects unknown option-like tokens with a
//! [`UsageError`].
//!
//! ```
//! use plugopt::{ConfigKeyDecl, ConfigKeyType, OptionAction, OptionAttrs, Registrar, Value};
//!
//! let mut registrar = Registrar::new().with_prog("pytest");
//! registrar
//!     .get_or_create_group("general", "general options", None)
//!     .add_core_option(
//!         &["-x", "--exitfirst"],
//!         OptionAttrs::new().action(OptionAction::StoreTrue),
//!     )?;
//! registrar.add_config_key(
//!     ConfigKeyDecl::new("xfail_strict", "default for xfail strict").kind(ConfigKeyType::Bool),
//! )?;
//!
//! let parsed = registrar.parse(["-x", "tests/unit"])?;
//! assert_eq!(parsed.get("exitfirst"), Some(&Value::Bool(true)));
//! assert_eq!(parsed.file_or_dir(), ["tests/unit"]);
//! # Ok::<(), plugopt::PlugoptError>(())
//! ```

mod completion;
mod config_keys;
mod engine;
mod error;
mod group;
pub mod help;
mod option;
mod registrar;
mod value;

pub use completion::{FilesCompleter, PathCompleter};
pub use config_keys::{
    ConfigKey, ConfigKeyDecl, ConfigKeyRegistry, ConfigKeyType, ConfigValue, DefaultValue,
};
pub use engine::ParseEngine;
pub use error::{PlugoptError, RegistrationError, UsageError};
pub use group::{OptionGroup, ProcessingHook};
pub use help::{HelpAction, HelpFormatter};
pub use option::{OptionAction, OptionAttrs, OptionSpec, ValueKind};
pub use registrar::Registrar;
pub use value::{FILE_OR_DIR, OVERRIDE_INI, OptionSink, ParsedArgs, Value};
