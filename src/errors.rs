//! Error types for Drive Fetcher
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for
//! debugging and user feedback.
//!
//! Two expected outcomes are deliberately absent from this taxonomy: a build
//! that finds no Drive references (surfaced as an advisory, not a failure)
//! and a per-task denial by the upstream service (absorbed by the retrieval
//! strategy's fallback path).

use std::path::PathBuf;
use thiserror::Error;

/// Tabular input decoding errors
///
/// Any of these fails the whole batch build; no partial task list is produced.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input file extension is not one the adapter can decode
    #[error("Unsupported file type: .{extension}. Upload a .csv, .xls or .xlsx file")]
    UnsupportedExtension { extension: String },

    /// Input file name carries no extension at all
    #[error("Input file has no extension; cannot determine tabular format")]
    MissingExtension,

    /// Delimited-text decoding error
    #[error("CSV decoding failed")]
    Csv(#[from] csv::Error),

    /// Spreadsheet-binary decoding error
    #[error("Workbook decoding failed")]
    Workbook(#[from] calamine::Error),

    /// Workbook contains no sheets to read
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// I/O error reading the input blob
    #[error("I/O error reading input")]
    Io(#[from] std::io::Error),
}

/// Retrieval service and delivery errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Retrieval target does not form a valid URL
    #[error("Invalid retrieval target: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server kept responding with 429 across the retry budget
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Server kept responding with 503 across the retry budget
    #[error("Server overloaded. Server responded with HTTP 503")]
    ServerOverloaded,

    /// Maximum retries exceeded on transport faults
    #[error("Maximum retry attempts ({max_retries}) exceeded for request")]
    MaxRetriesExceeded { max_retries: u32 },

    /// I/O error while delivering a payload
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// Task identifier not present in the task list
    #[error("Task not found: {identifier}")]
    TaskNotFound { identifier: String },

    /// Generic error for other issues
    #[error("{0}")]
    Other(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file named on the command line does not exist
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Tabular input error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Parse(_) => "parse",
            AppError::Download(_) => "download",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Parse result type alias
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;
