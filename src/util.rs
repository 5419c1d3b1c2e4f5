use crate::config::Config;
use crate::error::Error;
use crate::RhaiResult;
use rhai::{Dynamic, EvalAltResult, ImmutableString, Position};
use std::sync::Arc;

pub(crate) fn runtime_error(msg: impl Into<String>) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(Dynamic::from(msg.into()), Position::NONE).into()
}

/// Script errors carry the plain message, so a failed process surfaces its
/// stderr text unchanged.
pub(crate) fn map_err(err: Error) -> Box<EvalAltResult> {
    runtime_error(err.to_string())
}

pub(crate) fn dynamic_to_string(value: Dynamic, label: &str) -> RhaiResult<String> {
    value
        .try_cast::<ImmutableString>()
        .map(|s| s.into())
        .ok_or_else(|| runtime_error(format!("{label} must be a string")))
}

pub(crate) fn strings_from_array(items: crate::RhaiArray, label: &str) -> RhaiResult<Vec<String>> {
    items
        .into_iter()
        .map(|item| dynamic_to_string(item, label))
        .collect()
}

pub(crate) fn ensure_same_config(a: &Arc<Config>, b: &Arc<Config>) -> RhaiResult<()> {
    if Arc::ptr_eq(a, b) {
        Ok(())
    } else {
        Err(runtime_error("pipelines come from different modules"))
    }
}
