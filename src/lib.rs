#![doc = include_str!("../README.md")]

mod command_builder;
mod command_spec;
mod config;
mod error;
mod output;
mod pipeline;
mod registration;
mod runner;
mod script_pipeline;
mod util;

pub use command_builder::{Command, OutputFilter};
pub use config::Config;
pub use error::{Error, PipelineError, Result};
pub use output::{KeyHandlers, LineEnding, Output};
pub use pipeline::Pipeline;
pub use registration::{builder_module, module, register, ProcessPackage};
pub use runner::run_wait;
pub use script_pipeline::ScriptPipeline;

#[cfg(feature = "no_index")]
use rhai::Dynamic;
use rhai::EvalAltResult;

#[cfg(not(feature = "no_index"))]
pub(crate) type RhaiArray = rhai::Array;
#[cfg(feature = "no_index")]
pub(crate) type RhaiArray = Vec<Dynamic>;

type RhaiResult<T> = std::result::Result<T, Box<EvalAltResult>>;
