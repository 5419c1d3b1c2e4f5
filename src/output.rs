//! Captured process output and the line-oriented helpers used to inspect it.

use crate::command_spec::CommandSpec;
use crate::config::Config;
use crate::error::Result;
use crate::runner;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::ops::Deref;
use std::path::Path;

/// Handler map for [`Output::dispatch_lines`], keyed by the substring to look for.
pub type KeyHandlers<'a> = HashMap<&'a str, Box<dyn FnMut(&str) + 'a>>;

/// Line separator used to split captured output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// The convention of the platform this program runs on, regardless of
    /// where the captured text came from.
    pub const fn native() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

/// Text captured from a process's standard output, or a filtered derivative
/// of it. Never mutated once produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Output(String);

impl Output {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Runs `program` with this output as its standard input.
    pub fn run_wait<I, S>(&self, program: impl Into<String>, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new(
            program.into(),
            args.into_iter().map(Into::into).collect(),
        );
        runner::run(&Config::default(), &spec, self.as_str())
    }

    /// Capture groups of the first match of `expr`, whole match first.
    /// Groups that did not participate are empty strings.
    ///
    /// # Panics
    ///
    /// Panics if `expr` is not a valid regular expression.
    pub fn find_submatch(&self, expr: &str) -> Option<Vec<String>> {
        self.try_find_submatch(expr)
            .unwrap_or_else(|err| panic!("invalid regular expression: {err}"))
    }

    pub fn try_find_submatch(&self, expr: &str) -> Result<Option<Vec<String>>, regex::Error> {
        let re = Regex::new(expr)?;
        Ok(re.captures(&self.0).map(|caps| groups(&caps)))
    }

    /// Capture groups of every non-overlapping match of `expr`.
    ///
    /// # Panics
    ///
    /// Panics if `expr` is not a valid regular expression.
    pub fn find_all_submatch(&self, expr: &str) -> Vec<Vec<String>> {
        self.try_find_all_submatch(expr)
            .unwrap_or_else(|err| panic!("invalid regular expression: {err}"))
    }

    pub fn try_find_all_submatch(&self, expr: &str) -> Result<Vec<Vec<String>>, regex::Error> {
        let re = Regex::new(expr)?;
        Ok(re.captures_iter(&self.0).map(|caps| groups(&caps)).collect())
    }

    /// Splits on a literal separator. An empty separator yields one entry
    /// per character.
    pub fn split(&self, sep: &str) -> Vec<&str> {
        if sep.is_empty() {
            return self
                .0
                .char_indices()
                .map(|(idx, ch)| &self.0[idx..idx + ch.len_utf8()])
                .collect();
        }
        self.0.split(sep).collect()
    }

    /// Splits on the native line ending. Text produced with a different
    /// convention is not normalized: on Unix a CRLF line keeps its `\r`.
    pub fn lines(&self) -> Vec<&str> {
        self.lines_with(LineEnding::native())
    }

    pub fn lines_with(&self, ending: LineEnding) -> Vec<&str> {
        self.split(ending.as_str())
    }

    /// Visits lines from the top until `stop` returns `true`, returning that line.
    pub fn for_each_line<F>(&self, mut stop: F) -> Option<&str>
    where
        F: FnMut(&str) -> bool,
    {
        self.lines().into_iter().find(|line| stop(line))
    }

    /// Like [`Output::for_each_line`], starting from the last line.
    pub fn for_each_line_rev<F>(&self, mut stop: F) -> Option<&str>
    where
        F: FnMut(&str) -> bool,
    {
        self.lines().into_iter().rev().find(|line| stop(line))
    }

    /// Routes every line to the handler of the first key found in it, passing
    /// the remainder of the line after that key.
    ///
    /// Keys are tried in the map's iteration order, so when several keys
    /// occur in the same line the chosen handler is unspecified. Lines
    /// without any key are ignored.
    pub fn dispatch_lines<K, H>(&self, handlers: &mut HashMap<K, H>, trim: bool)
    where
        K: AsRef<str>,
        H: FnMut(&str),
    {
        for line in self.lines() {
            if let Some((handler, remain)) = match_key(handlers, line, trim) {
                handler(remain);
            }
        }
    }

    /// Like [`Output::dispatch_lines`], but a handler returning `true` stops
    /// the scan. Returns the line that stopped it.
    pub fn dispatch_lines_until<K, H>(&self, handlers: &mut HashMap<K, H>, trim: bool) -> Option<&str>
    where
        K: AsRef<str>,
        H: FnMut(&str) -> bool,
    {
        self.lines().into_iter().find(|line| {
            match_key(handlers, line, trim).is_some_and(|(handler, remain)| handler(remain))
        })
    }

    /// Writes the text verbatim to `path`, replacing any existing content.
    /// New files are created with mode `0o644` on Unix.
    pub fn write_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let mut file = options.open(path)?;
        file.write_all(self.0.as_bytes())
    }
}

fn groups(caps: &regex::Captures<'_>) -> Vec<String> {
    caps.iter()
        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
        .collect()
}

fn match_key<'h, 'l, K, H>(
    handlers: &'h mut HashMap<K, H>,
    line: &'l str,
    trim: bool,
) -> Option<(&'h mut H, &'l str)>
where
    K: AsRef<str>,
{
    handlers.iter_mut().find_map(|(key, handler)| {
        let key = key.as_ref();
        line.find(key).map(|idx| {
            let remain = &line[idx + key.len()..];
            (handler, if trim { remain.trim() } else { remain })
        })
    })
}

impl Deref for Output {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Output {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.0
    }
}

impl PartialEq<str> for Output {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Output {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
