//! Error types for the syntax crate.

use thiserror::Error;

/// Errors raised while tokenizing, parsing or assembling a template tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// Malformed template source. Positions are 1-based.
    #[error("{line}:{column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A section was created without a name.
    #[error("section name is required")]
    EmptyName,

    /// A section body can only be attached once.
    #[error("body of section '{0}' is already set")]
    BodyAlreadySet(String),
}

impl SyntaxError {
    pub(crate) fn parse(message: impl Into<String>, (line, column): (usize, usize)) -> Self {
        SyntaxError::Parse {
            message: message.into(),
            line,
            column,
        }
    }
}
