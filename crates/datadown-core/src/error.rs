//! Error types for datadown

use thiserror::Error;

/// Main error type for datadown operations.
///
/// Malformed Markdown is never an error: the parser degrades unmatched
/// markup to literal text. Only the cases below can fail a conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The requested output format is not registered
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The builder received a block shape the scanner should never emit
    #[error("internal invariant violation{}: {message}", line_suffix(.line))]
    InternalInvariantViolation {
        message: String,
        /// 1-based source line of the offending block, when known
        line: Option<usize>,
    },

    /// A serializer backend rejected the document tree
    #[error("serialization ({format}): {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error while reading or writing configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

/// Fieldless discriminant of [`ConvertError`], for callers that only
/// need to branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    InternalInvariantViolation,
    Serialization,
    Config,
    Io,
}

impl ConvertError {
    /// Build an invariant violation tied to a source line.
    pub fn invariant(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::InternalInvariantViolation {
            message: message.into(),
            line,
        }
    }

    /// Build a serialization error for the given format.
    pub fn serialization(format: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ConvertError::InternalInvariantViolation { .. } => ErrorKind::InternalInvariantViolation,
            ConvertError::Serialization { .. } => ErrorKind::Serialization,
            ConvertError::Config(_) => ErrorKind::Config,
            ConvertError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for datadown operations
pub type Result<T> = std::result::Result<T, ConvertError>;
