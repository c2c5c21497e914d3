use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryErr>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryErr {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
    #[error("Unknown column type: {0}")]
    UnknownType(String),
    #[error("Unterminated quoted value")]
    UnterminatedText,
    #[error("Invalid character: '{0}'")]
    InvalidToken(char),
}

impl QueryErr {
    pub(crate) fn unexpected(expected: impl Into<String>, found: impl ToString) -> Self {
        QueryErr::UnexpectedToken {
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}
