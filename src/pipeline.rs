use crate::command_builder::Command;
use crate::command_spec::CommandSpec;
use crate::config::Config;
use crate::error::{Error, PipelineError};
use crate::output::Output;
use crate::runner;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, trace};

/// Sequential chain of commands. The stdout of each stage, after its filter,
/// becomes the stdin of the next one.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    pub(crate) config: Arc<Config>,
    pub(crate) stages: Vec<Command>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            stages: Vec::new(),
        }
    }

    /// Appends a stage. An empty `program` makes the stage a no-op.
    pub fn add<I, S>(self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Command::new(program).args(args))
    }

    pub fn add_with_filter<I, S, F>(self, program: impl Into<String>, args: I, filter: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Output) -> Output + Send + Sync + 'static,
    {
        self.push(Command::new(program).args(args).filter(filter))
    }

    pub fn push(mut self, command: Command) -> Self {
        self.stages.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order and returns the last running output.
    ///
    /// The first failing stage stops the chain; later stages never run.
    pub fn run_wait(&self) -> Result<Output, PipelineError> {
        drive(
            &self.config,
            &self.stages,
            |stage| &stage.spec,
            |stage, output| Ok::<_, Infallible>(stage.apply_filter(output)),
        )
        .map_err(|halted| match halted.failure {
            StageFailure::Command(error) => PipelineError {
                program: self.stages[halted.stage].spec.program.clone(),
                output: halted.output,
                stage: halted.stage,
                error,
            },
            StageFailure::Filter(never) => match never {},
        })
    }
}

pub(crate) enum StageFailure<E> {
    Command(Error),
    Filter(E),
}

pub(crate) struct Halted<E> {
    pub(crate) output: Output,
    pub(crate) stage: usize,
    pub(crate) failure: StageFailure<E>,
}

/// Stage loop shared by native and script pipelines.
///
/// On failure `output` is the running output from before the failed stage.
pub(crate) fn drive<S, E>(
    config: &Config,
    stages: &[S],
    command: impl Fn(&S) -> &CommandSpec,
    mut filter: impl FnMut(&S, Output) -> Result<Output, E>,
) -> Result<Output, Halted<E>> {
    let mut output = Output::default();
    for (index, stage) in stages.iter().enumerate() {
        let spec = command(stage);
        if spec.is_noop() {
            trace!(stage = index, "skipping stage without a program");
            continue;
        }

        debug!(stage = index, program = %spec.program, "running pipeline stage");
        let produced = match runner::run(config, spec, output.as_str()) {
            Ok(produced) => produced,
            Err(error) => {
                debug!(stage = index, program = %spec.program, %error, "pipeline stage failed");
                return Err(Halted {
                    output,
                    stage: index,
                    failure: StageFailure::Command(error),
                });
            }
        };

        match filter(stage, produced) {
            Ok(filtered) => output = filtered,
            Err(error) => {
                return Err(Halted {
                    output,
                    stage: index,
                    failure: StageFailure::Filter(error),
                })
            }
        }
        debug!(stage = index, len = output.len(), "pipeline stage finished");
    }
    Ok(output)
}
