//! Error types for spanguard.
//!
//! Only conditions that stop an operation are errors. Dropped candidates,
//! unalignable ground truth, and malformed corpus rows are reported as typed
//! outcomes instead (see [`crate::resolver::Rejection`],
//! [`crate::eval::bio_adapter::ConversionError`] and
//! [`crate::eval::corpus::RowRejection`]).

use thiserror::Error;

/// Result type for spanguard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for spanguard operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Corpus loading error.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A detector failed to produce candidates.
    #[error("Detection failed ({detector}): {message}")]
    Detection {
        /// Name of the failing detector.
        detector: &'static str,
        /// Failure description.
        message: String,
    },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a dataset error.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Error::Dataset(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }

    /// Create a detection error.
    pub fn detection(detector: &'static str, msg: impl Into<String>) -> Self {
        Error::Detection {
            detector,
            message: msg.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
