//! Error types for the codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not well-formed JSON, or a value cannot be represented.
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The document parses but does not have the expected shape.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of the shape mismatch.
        message: String,
    },
}

impl CodecError {
    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }
}
