// src/task/template.rs

//! Typed command templates.
//!
//! A template is parsed **once** into literal and parameter segments, so
//! rendering a task never depends on comparing raw template text. The
//! supported placeholders are:
//!
//! - `{budget}`: the budget value in decimal
//! - `{output}`: the artifact path for this budget
//! - `{log}`: the log path for this budget
//!
//! `{{` and `}}` produce literal braces. Any other `{...}` or a lone brace is
//! rejected at parse time.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;

use crate::errors::{Result, SweepError};
use crate::task::{CommandSpec, TaskParams};

const TOKEN_PATTERN: &str = r"\{\{|\}\}|\{([^{}]*)\}|[{}]";

/// A value that can be substituted into an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Budget,
    Output,
    Log,
}

impl FromStr for Param {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "budget" => Ok(Param::Budget),
            "output" => Ok(Param::Output),
            "log" => Ok(Param::Log),
            other => Err(format!(
                "unknown placeholder {{{other}}} (expected {{budget}}, {{output}} or {{log}})"
            )),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Param::Budget => "budget",
            Param::Output => "output",
            Param::Log => "log",
        };
        write!(f, "{{{name}}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(Param),
}

/// One argument of a command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgTemplate {
    segments: Vec<Segment>,
}

impl ArgTemplate {
    fn parse_with(re: &Regex, text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&text[last..whole.start()]);
            last = whole.end();

            match whole.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                "{" | "}" => {
                    return Err(SweepError::Template(format!(
                        "unbalanced brace at offset {} in argument {text:?}",
                        whole.start()
                    )));
                }
                _ => {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let param = name.parse::<Param>().map_err(|e| {
                        SweepError::Template(format!("{e} in argument {text:?}"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Param(param));
                }
            }
        }

        literal.push_str(&text[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Substitute the task parameters into this argument.
    pub fn render(&self, params: &TaskParams<'_>) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(Param::Budget) => out.push_str(&params.budget.to_string()),
                Segment::Param(Param::Output) => {
                    out.push_str(path_str(params.artifact_path, Param::Output)?)
                }
                Segment::Param(Param::Log) => out.push_str(path_str(params.log_path, Param::Log)?),
            }
        }
        Ok(out)
    }
}

fn path_str(path: &Path, param: Param) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        SweepError::Template(format!("{param} path {path:?} is not valid UTF-8"))
    })
}

/// Parsed `program` + `args` template.
///
/// ```text
/// program = "clang++"
/// args = ["-mllvm", "--fpopt-comp-cost-budget={budget}", "-o", "{output}"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: ArgTemplate,
    args: Vec<ArgTemplate>,
}

impl CommandTemplate {
    pub fn parse(program: &str, args: &[String]) -> Result<Self> {
        let re = Regex::new(TOKEN_PATTERN)
            .map_err(|e| SweepError::Template(format!("building placeholder matcher: {e}")))?;

        if program.trim().is_empty() {
            return Err(SweepError::Template("program must not be empty".to_string()));
        }

        let program = ArgTemplate::parse_with(&re, program)?;
        let args = args
            .iter()
            .map(|a| ArgTemplate::parse_with(&re, a))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { program, args })
    }

    /// Parse an argv-style template where the first element is the program.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        match argv.split_first() {
            Some((program, args)) => Self::parse(program, args),
            None => Err(SweepError::Template("command must not be empty".to_string())),
        }
    }

    /// Whether any argument references the given parameter.
    pub fn uses(&self, param: Param) -> bool {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .flat_map(|a| a.segments())
            .any(|s| *s == Segment::Param(param))
    }
}

impl CommandSpec for CommandTemplate {
    fn resolve(&self, params: &TaskParams<'_>) -> Result<Vec<String>> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.render(params)?);
        for arg in &self.args {
            argv.push(arg.render(params)?);
        }
        Ok(argv)
    }
}
