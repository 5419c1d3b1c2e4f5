use runwait::{KeyHandlers, LineEnding, Output};
use std::collections::HashMap;
use tempfile::tempdir;

#[test]
fn lf_lines_split_in_order() {
    let output = Output::from("a\nb\nc");
    assert_eq!(output.lines_with(LineEnding::Lf), ["a", "b", "c"]);
}

#[cfg(not(windows))]
#[test]
fn native_lines_use_lf() {
    assert_eq!(LineEnding::native(), LineEnding::Lf);
    assert_eq!(Output::from("a\nb\nc").lines(), ["a", "b", "c"]);
    // CRLF text is not normalized
    assert_eq!(Output::from("a\r\nb").lines(), ["a\r", "b"]);
}

#[test]
fn crlf_lines_ignore_bare_lf() {
    let output = Output::from("a\r\nb\nc");
    assert_eq!(output.lines_with(LineEnding::CrLf), ["a", "b\nc"]);
}

#[test]
fn trailing_separator_yields_empty_last_line() {
    assert_eq!(Output::from("a\n").lines_with(LineEnding::Lf), ["a", ""]);
    assert_eq!(Output::default().lines_with(LineEnding::Lf), [""]);
}

#[test]
fn split_on_literal_and_empty_separator() {
    let output = Output::from("k=v=w");
    assert_eq!(output.split("="), ["k", "v", "w"]);
    assert_eq!(Output::from("añb").split(""), ["a", "ñ", "b"]);
}

#[test]
fn find_submatch_returns_first_match_groups() {
    let output = Output::from("version 1.2.3\nversion 4.5.6");
    let groups = output
        .find_submatch(r"version (\d+)\.(\d+)(-rc)?")
        .expect("should match");
    assert_eq!(groups, ["version 1.2", "1", "2", ""]);
    assert!(output.find_submatch(r"release \d+").is_none());
}

#[test]
fn find_all_submatch_returns_every_match() {
    let output = Output::from("a=1 b=2 c=3");
    let all = output.find_all_submatch(r"(\w)=(\d)");
    assert_eq!(all.len(), 3);
    assert_eq!(all[1], ["b=2", "b", "2"]);
    assert!(output.find_all_submatch(r"z=\d").is_empty());
}

#[test]
#[should_panic(expected = "invalid regular expression")]
fn invalid_regex_panics() {
    let _ = Output::from("text").find_submatch("(unclosed");
}

#[test]
fn try_variants_report_invalid_regex() {
    let output = Output::from("text");
    assert!(output.try_find_submatch("(unclosed").is_err());
    assert!(output.try_find_all_submatch("[").is_err());
}

#[test]
fn forward_scan_stops_at_first_match() {
    let output = Output::from("x\nSTOP\ny\nSTOP");
    let mut visited = Vec::new();
    let found = output.for_each_line(|line| {
        visited.push(line.to_owned());
        line == "STOP"
    });
    assert_eq!(found, Some("STOP"));
    assert_eq!(visited, ["x", "STOP"]);
}

#[test]
fn backward_scan_starts_from_the_end() {
    let output = Output::from("x\ny\nSTOP\nz");
    let mut visited = Vec::new();
    let found = output.for_each_line_rev(|line| {
        visited.push(line.to_owned());
        line == "STOP"
    });
    assert_eq!(found, Some("STOP"));
    assert_eq!(visited, ["z", "STOP"]);
}

#[test]
fn scans_without_a_stop_return_none() {
    let output = Output::from("a\nb");
    assert_eq!(output.for_each_line(|_| false), None);
    assert_eq!(output.for_each_line_rev(|_| false), None);
}

#[test]
fn dispatch_routes_trimmed_remainder_to_matching_key() {
    let output = Output::from("ok: fine\nline 2 ERR:   disk full  \nnothing here");
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut handlers: KeyHandlers<'_> = HashMap::new();
    handlers.insert("ERR:", Box::new(|rest: &str| errors.push(rest.to_owned())));
    handlers.insert("WARN:", Box::new(|rest: &str| warnings.push(rest.to_owned())));

    output.dispatch_lines(&mut handlers, true);
    drop(handlers);

    assert_eq!(errors, ["disk full"]);
    assert!(warnings.is_empty());
}

#[test]
fn dispatch_can_keep_surrounding_whitespace() {
    let output = Output::from("ERR: a \nERR:b");
    let mut seen = Vec::new();
    let mut handlers = HashMap::new();
    handlers.insert("ERR:", |rest: &str| seen.push(rest.to_owned()));

    output.dispatch_lines(&mut handlers, false);
    drop(handlers);

    assert_eq!(seen, [" a ", "b"]);
}

#[test]
fn dispatch_visits_every_line() {
    let output = Output::from("id: 1\nid: 2\nid: 3");
    let mut ids = Vec::new();
    let mut handlers = HashMap::new();
    handlers.insert("id:", |rest: &str| ids.push(rest.to_owned()));

    output.dispatch_lines(&mut handlers, true);
    drop(handlers);

    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn dispatch_until_stops_when_a_handler_asks() {
    let output = Output::from("step: 1\nstep: 2\nstep: done\nstep: 4");
    let mut steps = Vec::new();
    let mut handlers = HashMap::new();
    handlers.insert("step:", |rest: &str| {
        steps.push(rest.to_owned());
        rest == "done"
    });

    let stopped = output.dispatch_lines_until(&mut handlers, true);
    drop(handlers);

    assert_eq!(stopped, Some("step: done"));
    assert_eq!(steps, ["1", "2", "done"]);
}

#[test]
fn write_file_overwrites_existing_content() -> std::io::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.txt");
    std::fs::write(&path, "old content that is longer")?;

    Output::from("new\n").write_file(&path)?;
    assert_eq!(std::fs::read_to_string(&path)?, "new\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn write_file_creates_non_executable_file() -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let path = dir.path().join("fresh.txt");
    Output::from("data").write_file(&path)?;
    let mode = std::fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & 0o111, 0);
    Ok(())
}
