use crate::classifying::*;
use crate::error_handling::{CalcError, Result};
use crate::evaluating::{evaluate, Variables};
use crate::parsing::parse;
use crate::scanning::StringScanner;
use crate::values::Value;
use std::error::Error;

/// The outcome of one buffer line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineResult {
    blank,
    comment,
    value {
        rendered: String,
        /// Set when the line bound a variable.
        assigned: Option<String>,
    },
    error {
        message: String,
        /// Underlying cause, for diagnostics only.
        detail: Option<String>,
    },
}

impl LineResult {
    fn from_error(error: &CalcError) -> Self {
        LineResult::error {
            message: error.to_string(),
            detail: error.source().map(|source| source.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LineResult::error{..})
    }

    /// The text shown next to the line: empty for blank and comment lines.
    pub fn rendered(&self) -> &str {
        match self {
            LineResult::blank | LineResult::comment => "",
            LineResult::value{rendered, ..} => rendered,
            LineResult::error{message, ..} => message,
        }
    }
}

/// Evaluation state of one open document.
#[derive(Clone, Debug, Default)]
pub struct Session {
    variables: Variables,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn reset(&mut self) {
        self.variables.clear();
    }

    /// Re-evaluates a whole buffer from its first line, rebuilding the
    /// variables as it goes. Always yields one result per line.
    pub fn evaluate_buffer<I>(&mut self, lines: I) -> Vec<LineResult>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.reset();
        lines.into_iter().map(|line| self.evaluate_line(line.as_ref())).collect()
    }

    /// Like [`Session::evaluate_buffer`] for raw editor text.
    pub fn evaluate_text(&mut self, text: &str) -> Vec<LineResult> {
        self.evaluate_buffer(split_buffer(text))
    }

    fn evaluate_line(&mut self, line: &str) -> LineResult {
        match classify(line) {
            LineKind::blank => LineResult::blank,
            LineKind::comment => LineResult::comment,
            LineKind::expression(code) => match evaluate_code(code, &self.variables) {
                Ok(value) => LineResult::value{rendered: value.to_string(), assigned: None},
                Err(error) => LineResult::from_error(&error),
            },
            LineKind::assignment{name, expression} => match evaluate_code(expression, &self.variables) {
                Ok(value) => {
                    let rendered = value.to_string();
                    self.variables.insert(name.into(), value);
                    LineResult::value{rendered, assigned: Some(name.into())}
                },
                Err(error) => LineResult::from_error(&error),
            },
        }
    }
}

fn evaluate_code(code: &str, variables: &Variables) -> Result<Value> {
    let tree = parse(StringScanner::new(code)?)?;
    evaluate(&tree, variables)
}

/// Splits editor text into lines. A trailing line break opens one more
/// (empty) line and empty text is a single blank line.
pub fn split_buffer(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    if text.ends_with('\n') || lines.is_empty() {
        lines.push("");
    }
    lines
}

/// Evaluates a buffer in a fresh session.
pub fn evaluate_buffer<I>(lines: I) -> Vec<LineResult>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Session::new().evaluate_buffer(lines)
}
