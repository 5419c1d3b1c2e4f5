use crate::output::Output;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure of a single process execution.
///
/// When the child wrote anything to stderr, that text *is* the error and is
/// displayed verbatim. Otherwise the underlying execution failure is kept.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Stderr(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Exit(ExitStatus),
    #[error("command '{0}' is not permitted")]
    CommandNotPermitted(String),
    #[error("environment variable '{0}' is not permitted")]
    EnvNotPermitted(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A pipeline stopped at `stage`.
///
/// `output` is the running output as it stood before the failed stage ran.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineError {
    pub(crate) output: Output,
    pub(crate) stage: usize,
    pub(crate) program: String,
    pub(crate) error: Error,
}

impl PipelineError {
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Zero-based index of the failed stage, counting skipped stages.
    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_parts(self) -> (Output, Error) {
        (self.output, self.error)
    }
}
