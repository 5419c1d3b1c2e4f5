use crate::command_spec::CommandSpec;
use crate::output::Output;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Transform applied to a stage's output before it is handed on.
///
/// Filters have no error channel; one that needs to report failure has to
/// do so through its output.
pub type OutputFilter = Arc<dyn Fn(Output) -> Output + Send + Sync>;

/// One stage of a [`Pipeline`](crate::Pipeline): a program, its arguments
/// and an optional output filter.
#[derive(Clone)]
pub struct Command {
    pub(crate) spec: CommandSpec,
    pub(crate) filter: Option<OutputFilter>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            spec: CommandSpec::new(program.into(), Vec::new()),
            filter: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.spec.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds a variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.env.insert(key.into(), value.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec.cwd = Some(dir.into());
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(Output) -> Output + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn get_program(&self) -> &str {
        &self.spec.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.spec.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.spec.cwd.as_deref()
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub(crate) fn apply_filter(&self, output: Output) -> Output {
        match &self.filter {
            Some(filter) => filter(output),
            None => output,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("program", &self.spec.program)
            .field("args", &self.spec.args)
            .field("cwd", &self.spec.cwd)
            .field("env", &self.spec.env)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}
