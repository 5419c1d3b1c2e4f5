use crate::command_spec::CommandSpec;
use crate::config::Config;
use crate::output::Output;
use crate::runner;
use crate::script_pipeline::ScriptPipeline;
use crate::util::{map_err, runtime_error, strings_from_array};
use crate::RhaiArray;
use rhai::packages::Package;
use rhai::plugin::*;
use rhai::{Dynamic, Engine, FnPtr, ImmutableString, Map as RhaiMap, Module, NativeCallContext, Shared};
use std::sync::Arc;

/// Functions bound to a [`Config`]: process execution, pipeline creation and
/// line splitting.
pub fn module(config: Config) -> Module {
    let shared = Arc::new(config);
    let mut module = Module::new();
    attach_custom_types(&mut module);

    {
        let config = Arc::clone(&shared);
        module.set_native_fn("run_wait", move |program: ImmutableString, args: RhaiArray| {
            run_script_command(&config, program, args, "")
        });
    }
    {
        let config = Arc::clone(&shared);
        module.set_native_fn(
            "run_wait",
            move |input: ImmutableString, program: ImmutableString, args: RhaiArray| {
                run_script_command(&config, program, args, input.as_str())
            },
        );
    }
    {
        let config = Arc::clone(&shared);
        module.set_native_fn("pipeline", move || -> crate::RhaiResult<ScriptPipeline> {
            Ok(ScriptPipeline::new(Arc::clone(&config)))
        });
    }
    {
        let config = Arc::clone(&shared);
        module.set_native_fn(
            "lines",
            move |text: ImmutableString| -> crate::RhaiResult<RhaiArray> {
                Ok(Output::from(text.as_str())
                    .lines_with(config.line_ending)
                    .into_iter()
                    .map(|line| Dynamic::from(line.to_owned()))
                    .collect())
            },
        );
    }

    module
}

pub fn register(engine: &mut Engine, config: Config) {
    ProcessPackage::new(config).register_into_engine(engine);
}

/// Config-independent methods on pipelines and captured text.
pub fn builder_module() -> Module {
    let mut module = exported_module!(builder_api_module);
    attach_custom_types(&mut module);
    module
}

#[derive(Clone)]
pub struct ProcessPackage {
    builder_module: Shared<Module>,
    process_module: Shared<Module>,
}

impl ProcessPackage {
    pub fn new(config: Config) -> Self {
        Self {
            builder_module: builder_module().into(),
            process_module: module(config).into(),
        }
    }
}

impl Package for ProcessPackage {
    fn init(_: &mut Module) {}

    fn as_shared_module(&self) -> Shared<Module> {
        self.builder_module.clone()
    }

    fn register_into_engine(&self, engine: &mut Engine) -> &Self {
        engine.register_global_module(self.builder_module.clone());
        engine.register_global_module(self.process_module.clone());
        engine.register_static_module("process", self.process_module.clone());
        self
    }
}

fn attach_custom_types(module: &mut Module) {
    module.set_custom_type::<ScriptPipeline>("Pipeline");
}

fn run_script_command(
    config: &Config,
    program: ImmutableString,
    args: RhaiArray,
    input: &str,
) -> crate::RhaiResult<ImmutableString> {
    let spec = CommandSpec::new(program.into(), strings_from_array(args, "command argument")?);
    runner::run(config, &spec, input)
        .map(|output| output.into_string().into())
        .map_err(map_err)
}

fn submatch_array(groups: Vec<String>) -> RhaiArray {
    groups.into_iter().map(Dynamic::from).collect()
}

#[export_module]
pub mod builder_api_module {
    use super::*;

    #[rhai_fn(name = "add", return_raw)]
    pub fn pipeline_add(
        pipeline: ScriptPipeline,
        program: ImmutableString,
        args: RhaiArray,
    ) -> crate::RhaiResult<ScriptPipeline> {
        pipeline.push_stage(program, args, None)
    }

    #[rhai_fn(name = "add", return_raw)]
    pub fn pipeline_add_with_filter(
        pipeline: ScriptPipeline,
        program: ImmutableString,
        args: RhaiArray,
        filter: FnPtr,
    ) -> crate::RhaiResult<ScriptPipeline> {
        pipeline.push_stage(program, args, Some(filter))
    }

    #[rhai_fn(name = "pipe", return_raw)]
    pub fn pipeline_pipe(
        pipeline: ScriptPipeline,
        next: ScriptPipeline,
    ) -> crate::RhaiResult<ScriptPipeline> {
        pipeline.pipe(next)
    }

    #[rhai_fn(name = "run_wait", return_raw)]
    pub fn pipeline_run_wait(
        context: NativeCallContext,
        pipeline: ScriptPipeline,
    ) -> crate::RhaiResult<RhaiMap> {
        pipeline.run_wait(&context)
    }

    #[rhai_fn(name = "find_submatch", return_raw)]
    pub fn find_submatch(text: ImmutableString, expr: ImmutableString) -> crate::RhaiResult<Dynamic> {
        let found = Output::from(text.as_str())
            .try_find_submatch(expr.as_str())
            .map_err(|err| runtime_error(format!("invalid regular expression: {err}")))?;
        Ok(found.map_or(Dynamic::UNIT, |groups| Dynamic::from(submatch_array(groups))))
    }

    #[rhai_fn(name = "find_all_submatch", return_raw)]
    pub fn find_all_submatch(
        text: ImmutableString,
        expr: ImmutableString,
    ) -> crate::RhaiResult<RhaiArray> {
        let found = Output::from(text.as_str())
            .try_find_all_submatch(expr.as_str())
            .map_err(|err| runtime_error(format!("invalid regular expression: {err}")))?;
        Ok(found
            .into_iter()
            .map(|groups| Dynamic::from(submatch_array(groups)))
            .collect())
    }
}
