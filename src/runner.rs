use crate::command_spec::CommandSpec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::Output;
use duct::Expression;
use tracing::trace;

/// Runs `program` with empty input under the default [`Config`].
///
/// Returns stdout when the process exits successfully. Otherwise the error
/// is the captured stderr text when there is any, or the execution failure
/// itself (spawn error, exit status).
pub fn run_wait<I, S>(program: impl Into<String>, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Output::default().run_wait(program, args)
}

/// Executes one command to completion, blocking the calling thread.
pub(crate) fn run(config: &Config, spec: &CommandSpec, input: &str) -> Result<Output> {
    config.ensure_command_allowed(&spec.program)?;
    for key in spec.env.keys() {
        config.ensure_env_allowed(key)?;
    }

    trace!(
        program = %spec.program,
        args = ?spec.args,
        stdin_len = input.len(),
        "spawning process"
    );
    let mut expression = expression_from_spec(spec);
    expression = if input.is_empty() {
        expression.stdin_null()
    } else {
        expression.stdin_bytes(input.as_bytes().to_vec())
    };
    let output = expression
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()?;

    if output.status.success() {
        return Ok(Output::from(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ));
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if stderr.is_empty() {
        Err(Error::Exit(output.status))
    } else {
        Err(Error::Stderr(stderr))
    }
}

fn expression_from_spec(spec: &CommandSpec) -> Expression {
    let mut expr = duct::cmd(spec.program.clone(), spec.args.clone());
    if let Some(cwd) = &spec.cwd {
        expr = expr.dir(cwd.clone());
    }
    for (key, value) in &spec.env {
        expr = expr.env(key, value);
    }
    expr
}
