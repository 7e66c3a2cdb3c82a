//! Named, ordered collections of options.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::{OptionAttrs, OptionSpec, RegistrationError};

/// Callback invoked for every option inserted into a bound group.
///
/// The callback may adjust the spec (for instance its default) before it is
/// stored; later compilation reads the adjusted fields through
/// [`OptionSpec::attrs`].
pub type ProcessingHook = Arc<dyn Fn(&mut OptionSpec) + Send + Sync>;

/// A labelled section of options.
///
/// Groups created through [`Registrar`](crate::Registrar) share its
/// processing hook; the group never owns or refers back to the registrar
/// itself.
#[derive(Clone)]
pub struct OptionGroup {
    name: String,
    description: String,
    options: Vec<OptionSpec>,
    hook: Option<ProcessingHook>,
}

impl OptionGroup {
    /// Creates an unbound group.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            hook: None,
        }
    }

    pub(crate) fn bound(
        name: impl Into<String>,
        description: impl Into<String>,
        hook: Option<ProcessingHook>,
    ) -> Self {
        Self {
            hook,
            ..Self::new(name, description)
        }
    }

    pub(crate) fn set_hook(&mut self, hook: Option<ProcessingHook>) {
        self.hook = hook;
    }

    /// The group's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's description; may be empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Section heading used in help: the description, or the name when the
    /// description is empty.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        }
    }

    /// Options in insertion order.
    #[must_use]
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Adds an option on behalf of a plugin.
    ///
    /// Lowercase short options such as `-x` are reserved for the core and are
    /// rejected here; use uppercase short forms or long forms instead.
    ///
    /// # Errors
    ///
    /// Returns an error when a name collides with one already in this group,
    /// when a name is malformed, or when a lowercase short option is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugopt::{OptionAttrs, OptionGroup};
    ///
    /// let mut group = OptionGroup::new("reporting", "");
    /// group.add_option(&["-R", "--report-format"], OptionAttrs::new())?;
    /// assert!(group.add_option(&["-r"], OptionAttrs::new()).is_err());
    /// # Ok::<(), plugopt::RegistrationError>(())
    /// ```
    pub fn add_option(
        &mut self,
        names: &[&str],
        attrs: OptionAttrs,
    ) -> Result<(), RegistrationError> {
        self.insert(names, attrs, false)
    }

    /// Adds an option on behalf of the core, which may use lowercase short
    /// options.
    ///
    /// # Errors
    ///
    /// Returns an error when a name collides with one already in this group or
    /// is malformed.
    pub fn add_core_option(
        &mut self,
        names: &[&str],
        attrs: OptionAttrs,
    ) -> Result<(), RegistrationError> {
        self.insert(names, attrs, true)
    }

    fn insert(
        &mut self,
        names: &[&str],
        attrs: OptionAttrs,
        allow_lowercase_short: bool,
    ) -> Result<(), RegistrationError> {
        self.check_collisions(names)?;
        let mut spec = OptionSpec::new(names, attrs)?;
        if !allow_lowercase_short
            && let Some(reserved) = spec
                .short_names()
                .iter()
                .find(|name| name.chars().nth(1).is_some_and(char::is_lowercase))
        {
            return Err(RegistrationError::ReservedShortOption {
                name: reserved.clone(),
            });
        }
        if let Some(hook) = &self.hook
            && !spec.identifier().is_empty()
        {
            hook(&mut spec);
        }
        debug!(group = %self.name, option = %spec.identifier(), "registered option");
        self.options.push(spec);
        Ok(())
    }

    fn check_collisions(&self, names: &[&str]) -> Result<(), RegistrationError> {
        let mut conflicts: Vec<&str> = Vec::new();
        for (position, name) in names.iter().enumerate() {
            let repeated = names.iter().take(position).any(|earlier| earlier == name);
            let taken = self
                .options
                .iter()
                .any(|option| option.names().contains(name));
            if (repeated || taken) && !conflicts.contains(name) {
                conflicts.push(*name);
            }
        }
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(RegistrationError::DuplicateNames {
                names: conflicts.join(", "),
            })
        }
    }
}

impl fmt::Debug for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionGroup")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}
