//! Error types for Ledgerly

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input is not well-formed delimited text with a header row
    #[error("Failed to parse CSV data: {0}")]
    Parse(String),

    /// Well-formed input with nothing usable in it
    #[error("{0}")]
    Validation(String),

    #[error("No financial data available. Please upload data first.")]
    NoData,

    /// The LLM backend failed or answered with something unusable
    #[error("{0}")]
    Generation(String),

    /// The document renderer failed
    #[error("{0}")]
    Render(String),

    /// An external call ran past its deadline; safe to retry
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
