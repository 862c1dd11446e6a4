use crate::scanning::*;

/// What a single buffer line asks for, borrowed from the line itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    blank,
    comment,
    assignment { name: &'a str, expression: &'a str },
    expression(&'a str),
}

/// Drops everything from the first `#`. There are no string literals, so
/// a `#` always starts a comment.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return LineKind::comment;
    }
    let code = strip_comment(trimmed).trim();
    if code.is_empty() {
        return LineKind::blank;
    }
    match detect_assignment(code) {
        Some((name, expression)) => LineKind::assignment{name, expression},
        None => LineKind::expression(code),
    }
}

/// Splits `name = expression`. Anything else, including `==` and an empty
/// right-hand side, is left to be evaluated as a plain expression.
pub fn detect_assignment(code: &str) -> Option<(&str, &str)> {
    let mut scanner = StringScanner::new(code).ok()?;
    let target = scanner.get_current()?;
    if target.kind != TokenKind::identifier {
        return None;
    }
    let name = &code[target.offset..target.end()];

    scanner.advance().ok()?;
    if !scanner.get_current()?.is(TokenKind::operator, "=") {
        return None;
    }
    let expression = scanner.remainder().trim();
    if expression.is_empty() {
        None
    } else {
        Some((name, expression))
    }
}
