use thiserror::Error;

/// Why a line failed to parse. Never shown to the user directly, every
/// variant surfaces as "Invalid syntax" through [`CalcError::invalid_syntax`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("invalid character, '{0}', encountered")]
    invalid_character(char),

    #[error("'{0}' is not a valid number")]
    invalid_number(String),

    #[error("did not expect '{0}'")]
    did_not_expect(String),

    #[error("could not find '{0}'")]
    could_not_find(String),

    #[error("expression ended abruptly")]
    abrupt_end,

    #[error("expression is empty")]
    empty_expression,

    #[error("expression nests deeper than {0} levels")]
    too_deep(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Division by zero")]
    division_by_zero,

    #[error("Undefined variable - name '{0}' is not defined")]
    undefined(String),

    #[error("Invalid syntax")]
    invalid_syntax(#[from] SyntaxError),

    #[error("Invalid value - {0}")]
    invalid_value(String),

    #[error("Type error - {0}")]
    type_mismatch(String),

    #[error("Numerical result out of range")]
    overflow,
}

impl CalcError {
    pub(crate) fn math_domain() -> Self {
        CalcError::invalid_value("math domain error".into())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
