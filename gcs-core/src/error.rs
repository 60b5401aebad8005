//! # Error Handling
//!
//! Error types shared by the filter builder, the query engine and the CLI.
//!
//! ## Error Classes
//!
//! 1. **Structural**: `EndOfStream` is the routine end of an encoded payload
//! 2. **Parameter**: `InvalidParameter` rejects `(N, P)` before any bytes exist
//! 3. **Width**: `UnsupportedWidth` is reported instead of truncating a field
//! 4. **Lifecycle**: `WriterClosed` guards a finished bit stream

use thiserror::Error;

/// Result type alias for filter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Primary error type for Golomb-coded set operations
#[derive(Error, Debug)]
pub enum Error {
    // Bit stream errors
    #[error("End of stream: requested {requested} bits, {available} available")]
    EndOfStream { requested: u32, available: u64 },

    #[error("Unsupported bit width {width} (max {max})")]
    UnsupportedWidth { width: u32, max: u32 },

    #[error("Bit stream already closed")]
    WriterClosed,

    // Filter errors
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Malformed filter: {message}")]
    MalformedFilter { message: String },

    // System errors
    #[error("IO error: {message}")]
    Io { message: String, source: std::io::Error },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            message: message.into(),
        }
    }

    /// Check if error is recoverable.
    ///
    /// Only running off the end of a payload is expected during normal
    /// operation; the query engine turns it into a negative answer.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::EndOfStream { .. })
    }

    /// Get error code for logs and exit reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::EndOfStream { .. } => "END_OF_STREAM",
            Error::UnsupportedWidth { .. } => "UNSUPPORTED_WIDTH",
            Error::WriterClosed => "WRITER_CLOSED",
            Error::InvalidParameter { .. } => "INVALID_PARAMETER",
            Error::MalformedFilter { .. } => "MALFORMED_FILTER",
            Error::Io { .. } => "IO_ERROR",
            Error::Configuration { .. } => "CONFIG_ERROR",
            Error::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Extension trait for adding context to results
pub trait ResultExt<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            Error::Io { message, source } => Error::Io {
                message: format!("{}: {}", f(), message),
                source,
            },
            other => Error::Internal {
                message: format!("{}: {}", f(), other),
            },
        })
    }
}
