//! User-facing parse failures.

use std::fmt;

/// A command-line rejection ready to be printed to the user.
///
/// The rendered text follows `"{usage}\n{prog}: error: {message}"`, with an
/// optional `" ({hint})"` suffix naming the configuration source in use.
/// Reporting the error and choosing an exit status is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    message: String,
    rendered: String,
}

impl UsageError {
    /// Build a usage error from its parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::UsageError;
    ///
    /// let err = UsageError::new("usage: prog", "prog", "bad flag", Some("pyproject.toml"));
    /// assert_eq!(err.to_string(), "usage: prog\nprog: error: bad flag (pyproject.toml)");
    /// assert_eq!(err.message(), "bad flag");
    /// ```
    #[must_use]
    pub fn new(usage: &str, prog: &str, message: &str, hint: Option<&str>) -> Self {
        let mut rendered = format!("{usage}\n{prog}: error: {message}");
        if let Some(source) = hint {
            rendered.push_str(&format!(" ({source})"));
        }
        Self {
            message: message.to_owned(),
            rendered,
        }
    }

    /// The bare message without usage line, program prefix or hint.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The full text, including the usage line.
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl std::error::Error for UsageError {}
