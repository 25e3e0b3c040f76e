//! Error types for s3shift

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Object Errors
    #[error("The specified key does not exist: {0}")]
    NotFound(String),

    #[error("The specified multipart upload does not exist: {0}")]
    NoSuchUpload(String),

    #[error("Invalid part: {0}")]
    InvalidPart(String),

    #[error("Object needs {parts} parts, more than the limit of {limit}")]
    TooManyParts { parts: u64, limit: u32 },

    // Provider Errors
    #[error("{operation} failed: {message}")]
    Transient {
        operation: &'static str,
        message: String,
    },

    #[error("Multipart copy {upload_id} aborted after {} failed part(s), first: {first}", .failed_parts.len())]
    PartialMultipart {
        upload_id: String,
        failed_parts: Vec<u32>,
        first: Box<Error>,
    },

    #[error("{operation} timed out after {after_ms} ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Internal Errors
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a failed provider call
    pub fn transient(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Transient {
            operation,
            message: message.into(),
        }
    }

    /// Stable short code, used as a log field
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NotFound",
            Error::NoSuchUpload(_) => "NoSuchUpload",
            Error::InvalidPart(_) => "InvalidPart",
            Error::TooManyParts { .. } => "TooManyParts",
            Error::Transient { .. } => "TransientIOError",
            Error::PartialMultipart { .. } => "PartialMultipart",
            Error::Timeout { .. } => "Timeout",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::InternalError(_) => "InternalError",
            Error::Io(_) => "InternalError",
        }
    }
}
