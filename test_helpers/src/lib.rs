//! Test helpers shared across crates in the workspace.
//!
//! - [`env`] scopes environment variable changes, such as `COLUMNS` for help
//!   wrapping tests.
//! - [`argfile`] creates temporary directories holding `@file` argument lists.

pub mod argfile;
pub mod env;

/// Converts string literals into an owned argument vector.
///
/// # Examples
/// ```
/// let args = test_helpers::argv(["-v", "tests/"]);
/// assert_eq!(args, vec!["-v".to_owned(), "tests/".to_owned()]);
/// ```
#[must_use]
pub fn argv<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}
