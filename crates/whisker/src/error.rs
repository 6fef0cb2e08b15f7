//! Error types for compiling and rendering templates.
//!
//! This module provides [`WhiskerError`], the error type returned by every
//! public operation of the engine.

use thiserror::Error;
use whisker_syntax::SyntaxError;

/// Error type for template compilation and rendering.
///
/// A failure during rendering aborts the render. Output already written to
/// the sink stays there.
#[derive(Debug, Error)]
pub enum WhiskerError {
    /// A helper received a missing argument or one of the wrong shape.
    #[error("found '{found}', expected '{expected}'")]
    ArgumentType {
        /// What the helper got.
        found: String,
        /// What the helper needs.
        expected: String,
    },

    /// No template exists at the requested path.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template source could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Reading template source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model could not be converted into a value.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other rendering failure, with its cause when there is one.
    #[error("{message}")]
    Render {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WhiskerError {
    pub fn argument_type(found: impl Into<String>, expected: impl Into<String>) -> Self {
        WhiskerError::ArgumentType {
            found: found.into(),
            expected: expected.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        WhiskerError::Render {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `source` with a message describing what was being done.
    pub fn render_caused_by(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        WhiskerError::Render {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for whisker operations.
pub type Result<T> = std::result::Result<T, WhiskerError>;
