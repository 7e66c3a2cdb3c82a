//! Path completion for the catch-all positional.
//!
//! The engine never calls a completer itself; shell-completion integrations
//! fetch it from [`ParseEngine::path_completer`](crate::ParseEngine::path_completer).

use camino::{Utf8Path, Utf8PathBuf};

/// Produces completion candidates for a partially typed path.
pub trait PathCompleter: Send + Sync {
    /// Returns candidates extending `prefix`.
    fn complete(&self, prefix: &str) -> Vec<String>;
}

impl<F> PathCompleter for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn complete(&self, prefix: &str) -> Vec<String> {
        self(prefix)
    }
}

/// Completes files and directories relative to the working directory.
///
/// Directories are suffixed with `/`; entries starting with `.` are only
/// offered when the typed fragment starts with `.` as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesCompleter;

impl PathCompleter for FilesCompleter {
    fn complete(&self, prefix: &str) -> Vec<String> {
        let (dir, fragment) = split_prefix(prefix);
        let listing_dir: &Utf8Path = if dir.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            &dir
        };
        let Ok(entries) = listing_dir.read_dir_utf8() else {
            return Vec::new();
        };
        let mut candidates: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let hidden = name.starts_with('.') && !fragment.starts_with('.');
                if hidden || !name.starts_with(fragment) {
                    return None;
                }
                let mut candidate = dir.join(name).into_string();
                if entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                    candidate.push('/');
                }
                Some(candidate)
            })
            .collect();
        candidates.sort();
        candidates
    }
}

fn split_prefix(prefix: &str) -> (Utf8PathBuf, &str) {
    match prefix.rsplit_once('/') {
        Some((dir, fragment)) => (Utf8PathBuf::from(format!("{dir}/")), fragment),
        None => (Utf8PathBuf::new(), prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use cap_std::{ambient_authority, fs_utf8::Dir};

    #[test]
    fn completes_entries_in_named_directory() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non UTF-8 temp dir: {}", path.display()))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority()).context("open temp dir")?;
        dir.write("test_alpha.py", b"").context("write file")?;
        dir.write("test_beta.py", b"").context("write file")?;
        dir.write(".hidden_test.py", b"").context("write file")?;
        dir.create_dir("tests_unit").context("create dir")?;

        let candidates = FilesCompleter.complete(&format!("{root}/test"));
        assert_eq!(
            candidates,
            [
                format!("{root}/test_alpha.py"),
                format!("{root}/test_beta.py"),
                format!("{root}/tests_unit/"),
            ]
        );
        Ok(())
    }

    #[test]
    fn dotfiles_need_a_dot_prefix() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non UTF-8 temp dir: {}", path.display()))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority()).context("open temp dir")?;
        dir.write(".hidden.py", b"").context("write file")?;
        dir.write("shown.py", b"").context("write file")?;

        assert_eq!(
            FilesCompleter.complete(&format!("{root}/")),
            [format!("{root}/shown.py")]
        );
        assert_eq!(
            FilesCompleter.complete(&format!("{root}/.")),
            [format!("{root}/.hidden.py")]
        );
        Ok(())
    }

    #[test]
    fn missing_directory_yields_nothing() {
        assert!(FilesCompleter.complete("/definitely/not/here/x").is_empty());
    }

    #[test]
    fn closures_are_completers() {
        let completer = |prefix: &str| vec![format!("{prefix}.py")];
        assert_eq!(completer.complete("test_a"), ["test_a.py"]);
    }
}
