//! Temporary directories for `@file` argument lists.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tempfile::TempDir;

/// A temporary directory removed on drop.
///
/// Files are written through a capability handle rooted at the directory, so
/// helpers cannot escape it.
#[derive(Debug)]
pub struct ArgFileDir {
    _temp: TempDir,
    dir: Dir,
    root: Utf8PathBuf,
}

impl ArgFileDir {
    /// Creates an empty directory.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or its path is not UTF-8.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create temporary directory")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow!("temporary directory is not UTF-8: {}", path.display()))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .with_context(|| format!("open {root}"))?;
        Ok(Self {
            _temp: temp,
            dir,
            root,
        })
    }

    /// The directory's absolute path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Writes `lines` to `name`, one per line, and returns the `@path` token
    /// that refers to the file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    ///
    /// # Examples
    /// ```
    /// use test_helpers::argfile::ArgFileDir;
    ///
    /// let dir = ArgFileDir::new()?;
    /// let token = dir.write_args("args.txt", ["-v", "tests/"])?;
    /// assert!(token.starts_with('@'));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn write_args<I, S>(&self, name: &str, lines: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line.as_ref());
            contents.push('\n');
        }
        self.dir
            .write(name, contents)
            .with_context(|| format!("write {name}"))?;
        Ok(format!("@{}", self.root.join(name)))
    }
}
