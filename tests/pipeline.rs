#![cfg(unix)]

use runwait::{Command, Error, Output, Pipeline, PipelineError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn stdout_flows_into_the_next_stage() -> Result<(), PipelineError> {
    let output = Pipeline::new()
        .add("printf", ["foo\nbar\n"])
        .add("tr", ["a-z", "A-Z"])
        .run_wait()?;
    assert_eq!(output, "FOO\nBAR\n");
    Ok(())
}

#[test]
fn filter_transforms_raw_stdout() -> Result<(), PipelineError> {
    let output = Pipeline::new()
        .add_with_filter("printf", ["  padded  "], |out| Output::from(out.trim()))
        .run_wait()?;
    assert_eq!(output, "padded");
    Ok(())
}

#[test]
fn filtered_output_is_the_next_stdin() -> Result<(), PipelineError> {
    let output = Pipeline::new()
        .add_with_filter("printf", ["a\nb\nc"], |out| {
            Output::from(out.lines().into_iter().rev().collect::<Vec<_>>().join("\n"))
        })
        .add("tr", ["a-z", "A-Z"])
        .run_wait()?;
    assert_eq!(output, "C\nB\nA");
    Ok(())
}

#[test]
fn failure_short_circuits_and_keeps_previous_output() {
    let dir = tempdir().expect("tempdir");
    let marker = dir.path().join("third-stage-ran");
    let err = Pipeline::new()
        .add_with_filter("printf", ["first"], |out| Output::from(format!("[{out}]")))
        .add("sh", ["-c", "cat >/dev/null; printf 'second failed' >&2; exit 2"])
        .add("touch", [marker.to_string_lossy().into_owned()])
        .run_wait()
        .expect_err("second stage should fail");

    assert_eq!(err.stage(), 1);
    assert_eq!(err.program(), "sh");
    assert_eq!(err.output(), &Output::from("[first]"));
    assert_eq!(err.to_string(), "second failed");
    assert!(matches!(err.error(), Error::Stderr(_)));
    assert!(!marker.exists(), "stages after a failure must not run");
}

#[test]
fn failure_in_first_stage_leaves_output_empty() {
    let err = Pipeline::new()
        .add("false", [] as [&str; 0])
        .add("printf", ["never"])
        .run_wait()
        .expect_err("false should fail");
    let (output, error) = err.into_parts();
    assert!(output.is_empty());
    assert!(matches!(error, Error::Exit(_)));
}

#[test]
fn filter_does_not_run_for_a_failed_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let result = Pipeline::new()
        .add_with_filter("false", [] as [&str; 0], move |out| {
            seen.fetch_add(1, Ordering::SeqCst);
            out
        })
        .run_wait();
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_program_stage_is_skipped() -> Result<(), PipelineError> {
    let with_gap = Pipeline::new()
        .add("printf", ["abc"])
        .add("", ["ignored"])
        .add("tr", ["a-z", "A-Z"])
        .run_wait()?;
    let without_gap = Pipeline::new()
        .add("printf", ["abc"])
        .add("tr", ["a-z", "A-Z"])
        .run_wait()?;
    assert_eq!(with_gap, "ABC");
    assert_eq!(with_gap, without_gap);
    Ok(())
}

#[test]
fn empty_pipeline_yields_empty_output() -> Result<(), PipelineError> {
    let pipeline = Pipeline::new();
    assert!(pipeline.is_empty());
    assert!(pipeline.run_wait()?.is_empty());
    Ok(())
}

#[test]
fn pushed_commands_keep_their_filters() -> Result<(), PipelineError> {
    let stage = Command::new("printf")
        .arg("%s-%s")
        .args(["x", "y"])
        .filter(|out| Output::from(out.replace('-', "+")));
    assert!(stage.has_filter());
    assert_eq!(stage.get_program(), "printf");
    assert_eq!(stage.get_args(), ["%s-%s", "x", "y"]);

    let pipeline = Pipeline::new().push(stage);
    assert_eq!(pipeline.len(), 1);
    assert_eq!(pipeline.run_wait()?, "x+y");
    Ok(())
}

#[test]
fn pipeline_can_run_twice() -> Result<(), PipelineError> {
    let pipeline = Pipeline::new().add("printf", ["again"]);
    assert_eq!(pipeline.run_wait()?, pipeline.run_wait()?);
    Ok(())
}
