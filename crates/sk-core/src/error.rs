//! Error types for code parsing.

use crate::dialect::Dialect;
use thiserror::Error;

/// Result type for dialect parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Why a piece of dialect text could not be turned into a scene.
///
/// A parse either succeeds completely or fails with one of these; no partial
/// scene is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not follow the dialect's grammar (unterminated tag or
    /// block, unexpected token, trailing garbage).
    #[error("{dialect} syntax error: {message}")]
    Syntax { dialect: Dialect, message: String },

    /// The grammar matched but a field value could not be read.
    #[error("{dialect}: invalid value {value:?} for `{field}`")]
    InvalidValue {
        dialect: Dialect,
        field: String,
        value: String,
    },
}

impl ParseError {
    pub fn syntax(dialect: Dialect, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            dialect,
            message: message.into(),
        }
    }

    pub fn invalid(dialect: Dialect, field: impl Into<String>, value: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            dialect,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ParseError::Syntax { dialect, .. } | ParseError::InvalidValue { dialect, .. } => {
                *dialect
            }
        }
    }
}
