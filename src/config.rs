use crate::error::{Error, Result};
use crate::output::LineEnding;
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) command_policy: ListPolicy,
    pub(crate) env_policy: ListPolicy,
    pub(crate) line_ending: LineEnding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_policy: ListPolicy::Unrestricted,
            env_policy: ListPolicy::Unrestricted,
            line_ending: LineEnding::native(),
        }
    }
}

impl Config {
    /// Restricts execution to the given program names.
    ///
    /// # Panics
    ///
    /// Panics if a deny list was already configured.
    pub fn allow_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_policy
            .insert_allow(commands.into_iter().map(Into::into));
        self
    }

    /// Refuses the given program names.
    ///
    /// # Panics
    ///
    /// Panics if an allow list was already configured.
    pub fn deny_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_policy
            .insert_deny(commands.into_iter().map(Into::into));
        self
    }

    pub fn allow_env_vars<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_policy
            .insert_allow(keys.into_iter().map(Into::into));
        self
    }

    pub fn deny_env_vars<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_policy
            .insert_deny(keys.into_iter().map(Into::into));
        self
    }

    /// Separator used when scripts split captured output into lines.
    pub fn line_ending(mut self, ending: LineEnding) -> Self {
        self.line_ending = ending;
        self
    }

    pub fn get_line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub(crate) fn ensure_command_allowed(&self, name: &str) -> Result<()> {
        if self.command_policy.is_allowed(name) {
            Ok(())
        } else {
            Err(Error::CommandNotPermitted(name.to_owned()))
        }
    }

    pub(crate) fn ensure_env_allowed(&self, key: &str) -> Result<()> {
        if self.env_policy.is_allowed(key) {
            Ok(())
        } else {
            Err(Error::EnvNotPermitted(key.to_owned()))
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum ListPolicy {
    Unrestricted,
    Allow(HashSet<String>),
    Deny(HashSet<String>),
}

impl ListPolicy {
    fn insert_allow<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self {
            ListPolicy::Unrestricted => *self = ListPolicy::Allow(values.into_iter().collect()),
            ListPolicy::Allow(existing) => existing.extend(values),
            ListPolicy::Deny(_) => {
                panic!("deny list already specified; allow list cannot be combined")
            }
        }
    }

    fn insert_deny<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self {
            ListPolicy::Unrestricted => *self = ListPolicy::Deny(values.into_iter().collect()),
            ListPolicy::Deny(existing) => existing.extend(values),
            ListPolicy::Allow(_) => {
                panic!("allow list already specified; deny list cannot be combined")
            }
        }
    }

    fn is_allowed(&self, value: &str) -> bool {
        match self {
            ListPolicy::Unrestricted => true,
            ListPolicy::Allow(list) => list.contains(value),
            ListPolicy::Deny(list) => !list.contains(value),
        }
    }
}
