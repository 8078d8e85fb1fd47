//! Error handling module for VodClip

use thiserror::Error;

/// Main error type for VodClip operations
#[derive(Error, Debug)]
pub enum ClipError {
    /// The encoder binary could not be resolved on PATH
    #[error("{tool} not found. Please install FFmpeg and ensure it is in your PATH.")]
    ToolNotFound { tool: String },

    /// The encoder ran but did not exit successfully
    #[error("FFmpeg failed for {output_filename}")]
    ToolExecutionFailed {
        output_filename: String,
        exit_code: Option<i32>,
    },

    /// Anything the worker could not classify more precisely
    #[error("Unexpected worker failure: {message}")]
    UnexpectedWorkerFailure { message: String },

    /// An extraction run is already active
    #[error("An extraction run is already in progress")]
    RunInProgress,

    /// Source video missing or not a regular file
    #[error("Please select a valid VOD file: {path}")]
    MissingVod { path: String },

    /// Match start offset is not numeric
    #[error("Enter a numeric offset in seconds (got '{value}')")]
    InvalidOffset { value: String },

    /// Event list could not be parsed
    #[error("Invalid event timestamp '{value}': expected a non-negative whole number of seconds")]
    InvalidEvent { value: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClipError {
    /// Build a configuration error from any displayable message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for VodClip operations
pub type ClipResult<T> = std::result::Result<T, ClipError>;
