use crate::command_spec::CommandSpec;
use crate::config::Config;
use crate::output::Output;
use crate::pipeline::{drive, StageFailure};
use crate::util::{ensure_same_config, map_err, strings_from_array};
use crate::{RhaiArray, RhaiResult};
use rhai::{Dynamic, FnPtr, ImmutableString, Map as RhaiMap, NativeCallContext, INT};
use std::sync::Arc;

/// Pipeline built from a script. Filters are script function pointers.
#[derive(Clone, Debug)]
pub struct ScriptPipeline {
    pub(crate) config: Arc<Config>,
    pub(crate) stages: Vec<ScriptStage>,
}

#[derive(Clone, Debug)]
pub(crate) struct ScriptStage {
    pub(crate) command: CommandSpec,
    pub(crate) filter: Option<FnPtr>,
}

impl ScriptPipeline {
    pub(crate) fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            stages: Vec::new(),
        }
    }

    pub(crate) fn push_stage(
        mut self,
        program: ImmutableString,
        args: RhaiArray,
        filter: Option<FnPtr>,
    ) -> RhaiResult<Self> {
        let program: String = program.into();
        if !program.is_empty() {
            self.config.ensure_command_allowed(&program).map_err(map_err)?;
        }
        let args = strings_from_array(args, "command argument")?;
        self.stages.push(ScriptStage {
            command: CommandSpec::new(program, args),
            filter,
        });
        Ok(self)
    }

    pub(crate) fn pipe(mut self, next: ScriptPipeline) -> RhaiResult<Self> {
        ensure_same_config(&self.config, &next.config)?;
        self.stages.extend(next.stages);
        Ok(self)
    }

    /// A failing command is reported in the result map; an error raised by a
    /// filter propagates to the script.
    pub(crate) fn run_wait(&self, context: &NativeCallContext) -> RhaiResult<RhaiMap> {
        let outcome = drive(
            &self.config,
            &self.stages,
            |stage| &stage.command,
            |stage, output| match &stage.filter {
                Some(filter) => filter
                    .call_within_context::<ImmutableString>(
                        context,
                        (ImmutableString::from(output.as_str()),),
                    )
                    .map(|filtered| Output::from(filtered.as_str())),
                None => Ok(output),
            },
        );

        let result = match outcome {
            Ok(output) => RunResult {
                output,
                failed: None,
            },
            Err(halted) => match halted.failure {
                StageFailure::Command(error) => RunResult {
                    output: halted.output,
                    failed: Some((halted.stage, error.to_string())),
                },
                StageFailure::Filter(error) => return Err(error),
            },
        };
        Ok(result.into_map())
    }
}

struct RunResult {
    output: Output,
    failed: Option<(usize, String)>,
}

impl RunResult {
    fn into_map(self) -> RhaiMap {
        let mut map = RhaiMap::new();
        map.insert("success".into(), Dynamic::from_bool(self.failed.is_none()));
        map.insert("output".into(), Dynamic::from(self.output.into_string()));
        match self.failed {
            Some((stage, message)) => {
                let stage: INT = stage.try_into().unwrap_or(INT::MAX);
                map.insert("stage".into(), Dynamic::from_int(stage));
                map.insert("error".into(), Dynamic::from(message));
            }
            None => {
                map.insert("stage".into(), Dynamic::UNIT);
                map.insert("error".into(), Dynamic::UNIT);
            }
        }
        map
    }
}
