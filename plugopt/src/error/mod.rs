//! Error types produced while registering options and parsing arguments.

mod types;
mod usage;

pub use types::{PlugoptError, RegistrationError};
pub use usage::UsageError;
