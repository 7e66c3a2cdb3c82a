//! The registration facade handed to plugins.
//!
//! A [`Registrar`] owns the option groups, the anonymous "Custom options"
//! group and the config-key registry. Parsing compiles a fresh
//! [`ParseEngine`] from the current registrations every time, so options
//! added between parses are always honoured.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use tracing::debug;

use crate::{
    ConfigKey, ConfigKeyDecl, ConfigKeyRegistry, FILE_OR_DIR, FilesCompleter, HelpFormatter,
    OptionAttrs, OptionGroup, OptionSink, OptionSpec, ParseEngine, ParsedArgs, PathCompleter,
    PlugoptError, ProcessingHook, RegistrationError,
};

const ANONYMOUS_GROUP: &str = "Custom options";
const FALLBACK_PROG: &str = "plugopt";

/// Collects options and configuration keys from the core and from plugins.
#[derive(Clone)]
pub struct Registrar {
    anonymous: OptionGroup,
    groups: Vec<OptionGroup>,
    config_keys: ConfigKeyRegistry,
    extra_info: BTreeMap<String, String>,
    usage: Option<String>,
    prog: String,
    config_source_hint: Option<String>,
    hook: Option<ProcessingHook>,
    completer: Arc<dyn PathCompleter>,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar {
    /// Creates an empty registrar named after the running executable.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anonymous: OptionGroup::new(ANONYMOUS_GROUP, ""),
            groups: Vec::new(),
            config_keys: ConfigKeyRegistry::new(),
            extra_info: BTreeMap::new(),
            usage: None,
            prog: default_prog(),
            config_source_hint: None,
            hook: None,
            completer: Arc::new(FilesCompleter),
        }
    }

    /// Replaces the usage text. `%(prog)s` is substituted with the program
    /// name.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Sets the program name shown in usage errors.
    #[must_use]
    pub fn with_prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = prog.into();
        self
    }

    /// Names the configuration source, appended to usage errors.
    #[must_use]
    pub fn with_config_source_hint(mut self, hint: impl Into<String>) -> Self {
        self.config_source_hint = Some(hint.into());
        self
    }

    /// Installs the option-processing callback.
    ///
    /// The hook runs for every option inserted afterwards, in any group.
    #[must_use]
    pub fn with_processing_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut OptionSpec) + Send + Sync + 'static,
    {
        self.set_processing_hook(Arc::new(hook));
        self
    }

    /// Replaces the option-processing callback on the registrar and every
    /// existing group.
    pub fn set_processing_hook(&mut self, hook: ProcessingHook) {
        self.anonymous.set_hook(Some(Arc::clone(&hook)));
        for group in &mut self.groups {
            group.set_hook(Some(Arc::clone(&hook)));
        }
        self.hook = Some(hook);
    }

    /// Replaces the completer offered for `file_or_dir`.
    pub fn set_path_completer<C>(&mut self, completer: C)
    where
        C: PathCompleter + 'static,
    {
        self.completer = Arc::new(completer);
    }

    /// Adds a plugin option to the anonymous "Custom options" group.
    ///
    /// # Errors
    ///
    /// See [`OptionGroup::add_option`].
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{OptionAction, OptionAttrs, Registrar, Value};
    ///
    /// let mut registrar = Registrar::new().with_prog("pytest");
    /// registrar.add_option(
    ///     &["--runslow"],
    ///     OptionAttrs::new().action(OptionAction::StoreTrue).help("run slow tests"),
    /// )?;
    /// let parsed = registrar.parse(["--runslow", "tests/"])?;
    /// assert_eq!(parsed.get("runslow"), Some(&Value::Bool(true)));
    /// assert_eq!(parsed.file_or_dir(), ["tests/"]);
    /// # Ok::<(), plugopt::PlugoptError>(())
    /// ```
    pub fn add_option(
        &mut self,
        names: &[&str],
        attrs: OptionAttrs,
    ) -> Result<(), RegistrationError> {
        self.anonymous.add_option(names, attrs)
    }

    /// Adds a core option, which may use lowercase short names, to the
    /// anonymous group.
    ///
    /// # Errors
    ///
    /// See [`OptionGroup::add_core_option`].
    pub fn add_core_option(
        &mut self,
        names: &[&str],
        attrs: OptionAttrs,
    ) -> Result<(), RegistrationError> {
        self.anonymous.add_core_option(names, attrs)
    }

    /// Returns the group called `name`, creating it when absent.
    ///
    /// A new group is inserted directly after the first group named `after`.
    /// When `after` is `None` or names no existing group, the new group is
    /// appended. An existing group keeps its original description.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::Registrar;
    ///
    /// let mut registrar = Registrar::new();
    /// registrar.get_or_create_group("general", "general options", None);
    /// registrar.get_or_create_group("reporting", "", None);
    /// registrar.get_or_create_group("debugging", "", Some("general"));
    /// let names: Vec<&str> = registrar.groups().iter().map(|group| group.name()).collect();
    /// assert_eq!(names, ["general", "debugging", "reporting"]);
    /// ```
    #[expect(
        clippy::indexing_slicing,
        reason = "position was found in or inserted into the group list"
    )]
    pub fn get_or_create_group(
        &mut self,
        name: &str,
        description: &str,
        after: Option<&str>,
    ) -> &mut OptionGroup {
        let position = match self.groups.iter().position(|group| group.name() == name) {
            Some(existing) => existing,
            None => {
                let position = after
                    .and_then(|after| self.groups.iter().position(|group| group.name() == after))
                    .map_or(self.groups.len(), |anchor| anchor + 1);
                debug!(group = name, position, "created option group");
                self.groups.insert(
                    position,
                    OptionGroup::bound(name, description, self.hook.clone()),
                );
                position
            }
        };
        &mut self.groups[position]
    }

    /// Named groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    /// The group receiving options added directly to the registrar.
    #[must_use]
    pub const fn anonymous_group(&self) -> &OptionGroup {
        &self.anonymous
    }

    /// Declares a configuration key.
    ///
    /// # Errors
    ///
    /// See [`ConfigKeyRegistry::register`].
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{ConfigKeyDecl, ConfigKeyType, ConfigValue, Registrar};
    ///
    /// let mut registrar = Registrar::new();
    /// registrar.add_config_key(
    ///     ConfigKeyDecl::new("markers", "registered markers")
    ///         .kind(ConfigKeyType::LineList)
    ///         .aliases(["marks"]),
    /// )?;
    /// let key = registrar.config_key("marks").expect("alias resolves");
    /// assert_eq!(key.default, ConfigValue::List(Vec::new()));
    /// # Ok::<(), plugopt::RegistrationError>(())
    /// ```
    pub fn add_config_key(&mut self, decl: ConfigKeyDecl) -> Result<(), RegistrationError> {
        self.config_keys.register(decl)
    }

    /// Looks up a configuration key by canonical name or alias.
    #[must_use]
    pub fn config_key(&self, name: &str) -> Option<&ConfigKey> {
        self.config_keys.get(name)
    }

    /// Every declared configuration key.
    #[must_use]
    pub const fn config_keys(&self) -> &ConfigKeyRegistry {
        &self.config_keys
    }

    /// Records a diagnostic echoed into unrecognized-argument errors.
    pub fn insert_extra_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_info.insert(key.into(), value.into());
    }

    /// Diagnostics echoed into unrecognized-argument errors, sorted by key.
    #[must_use]
    pub const fn extra_info(&self) -> &BTreeMap<String, String> {
        &self.extra_info
    }

    /// The program name shown in usage errors.
    #[must_use]
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// The configuration source appended to usage errors, if any.
    #[must_use]
    pub fn config_source_hint(&self) -> Option<&str> {
        self.config_source_hint.as_deref()
    }

    /// The complete `usage:` line.
    #[must_use]
    pub fn usage_line(&self) -> String {
        match &self.usage {
            Some(usage) => format!("usage: {}", usage.replace("%(prog)s", &self.prog)),
            None => format!("usage: {} [options] [{FILE_OR_DIR} ...]", self.prog),
        }
    }

    pub(crate) fn path_completer(&self) -> Arc<dyn PathCompleter> {
        Arc::clone(&self.completer)
    }

    /// Non-empty groups in compilation order: named groups, then the
    /// anonymous group.
    pub(crate) fn populated_groups(&self) -> impl Iterator<Item = &OptionGroup> {
        self.groups
            .iter()
            .chain(std::iter::once(&self.anonymous))
            .filter(|group| !group.options().is_empty())
    }

    /// Compiles the current registrations.
    ///
    /// # Errors
    ///
    /// See [`ParseEngine::compile`].
    pub fn compile(&self) -> Result<ParseEngine, RegistrationError> {
        ParseEngine::compile(self)
    }

    /// Parses `args`, rejecting unrecognized option-like tokens.
    ///
    /// # Errors
    ///
    /// Returns [`PlugoptError::Registration`]
    /// when the registrations cannot be compiled and
    /// [`PlugoptError::Usage`] when `args` are
    /// rejected.
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedArgs, PlugoptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.compile()?.parse(args)?)
    }

    /// Parses the recognised part of `args`, ignoring leftovers.
    ///
    /// # Errors
    ///
    /// See [`Registrar::parse`].
    pub fn parse_known_args<I, S>(&self, args: I) -> Result<ParsedArgs, PlugoptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.compile()?.parse_known_args(args)?)
    }

    /// Parses `args` and returns the leftovers alongside the result.
    ///
    /// # Errors
    ///
    /// See [`Registrar::parse`].
    pub fn parse_known_and_unknown_args<I, S>(
        &self,
        args: I,
    ) -> Result<(ParsedArgs, Vec<String>), PlugoptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.compile()?.parse_known_and_unknown_args(args)?)
    }

    /// Parses `args`, applies every value to `sink` and returns the
    /// `file_or_dir` list.
    ///
    /// # Errors
    ///
    /// See [`Registrar::parse`].
    pub fn parse_and_apply<I, S, K>(
        &self,
        args: I,
        sink: &mut K,
    ) -> Result<Vec<String>, PlugoptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        K: OptionSink + ?Sized,
    {
        Ok(self.compile()?.parse_and_apply(args, sink)?)
    }

    /// Renders the help page at the current terminal width.
    ///
    /// # Errors
    ///
    /// Returns a registration error when the options cannot be compiled or an
    /// invocation cannot be formatted.
    pub fn format_help(&self) -> Result<String, RegistrationError> {
        let engine = self.compile()?;
        engine.format_help(&mut HelpFormatter::new(), &self.config_keys)
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("anonymous", &self.anonymous)
            .field("groups", &self.groups)
            .field("config_keys", &self.config_keys)
            .field("extra_info", &self.extra_info)
            .field("usage", &self.usage)
            .field("prog", &self.prog)
            .field("config_source_hint", &self.config_source_hint)
            .finish_non_exhaustive()
    }
}

fn default_prog() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| arg0.into_string().ok())
        .and_then(|arg0| Utf8Path::new(&arg0).file_name().map(str::to_owned))
        .unwrap_or_else(|| FALLBACK_PROG.to_owned())
}
