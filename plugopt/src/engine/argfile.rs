//! Expansion of `@file` arguments.
//!
//! A token of the form `@path` is replaced by the lines of `path`, one
//! argument per line, and the inserted arguments are expanded in turn. Paths
//! resolve against the working directory.

use camino::{Utf8Path, Utf8PathBuf};

const PREFIX: char = '@';

/// Expands every `@file` token in `args`.
///
/// # Errors
///
/// Returns a message suitable for a usage error when a file cannot be read or
/// when argument files include one another cyclically.
pub(crate) fn expand(args: Vec<String>) -> Result<Vec<String>, String> {
    let mut stack = Vec::new();
    expand_inner(args, &mut stack)
}

fn expand_inner(args: Vec<String>, stack: &mut Vec<Utf8PathBuf>) -> Result<Vec<String>, String> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        let Some(path) = arg.strip_prefix(PREFIX) else {
            expanded.push(arg);
            continue;
        };
        expanded.extend(read_arg_file(Utf8Path::new(path), stack)?);
    }
    Ok(expanded)
}

fn read_arg_file(path: &Utf8Path, stack: &mut Vec<Utf8PathBuf>) -> Result<Vec<String>, String> {
    let canonical = path
        .canonicalize_utf8()
        .map_err(|err| format!("cannot read argument file '{path}': {err}"))?;
    if stack.contains(&canonical) {
        let mut cycle: Vec<String> = stack.iter().map(ToString::to_string).collect();
        cycle.push(canonical.to_string());
        return Err(format!("cyclic argument files: {}", cycle.join(" -> ")));
    }
    let contents = std::fs::read_to_string(&canonical)
        .map_err(|err| format!("cannot read argument file '{path}': {err}"))?;
    let lines = contents.lines().map(str::to_owned).collect();
    stack.push(canonical);
    let result = expand_inner(lines, stack);
    stack.pop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use test_helpers::argfile::ArgFileDir;

    #[test]
    fn lines_become_arguments() -> Result<()> {
        let dir = ArgFileDir::new()?;
        let token = dir.write_args("args.txt", ["-v", "--maxfail", "3"])?;
        let expanded = expand(vec!["first".to_owned(), token, "last".to_owned()])
            .map_err(anyhow::Error::msg)?;
        assert_eq!(expanded, ["first", "-v", "--maxfail", "3", "last"]);
        Ok(())
    }

    #[test]
    fn nested_files_expand_recursively() -> Result<()> {
        let dir = ArgFileDir::new()?;
        let inner = dir.write_args("inner.txt", ["b.py"])?;
        let outer = dir.write_args("outer.txt", ["a.py".to_owned(), inner])?;
        let expanded = expand(vec![outer]).map_err(anyhow::Error::msg)?;
        assert_eq!(expanded, ["a.py", "b.py"]);
        Ok(())
    }

    #[test]
    fn cycles_are_reported() -> Result<()> {
        let dir = ArgFileDir::new()?;
        let own_token = format!("@{}", dir.path().join("loop.txt"));
        let token = dir.write_args("loop.txt", [own_token])?;
        let err = expand(vec![token]).err().context("cycle should fail")?;
        assert!(err.starts_with("cyclic argument files:"), "{err}");
        Ok(())
    }

    #[test]
    fn missing_files_are_reported() -> Result<()> {
        let dir = ArgFileDir::new()?;
        let missing = dir.path().join("absent.txt");
        let err = expand(vec![format!("@{missing}")])
            .err()
            .context("missing file should fail")?;
        assert!(err.contains("absent.txt"), "{err}");
        Ok(())
    }
}
