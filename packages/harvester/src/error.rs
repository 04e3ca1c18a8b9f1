//! Error types for the harvester.
//!
//! Only fatal conditions live here. Remote lookups never produce an error:
//! failures there degrade to "no information" (see [`crate::http::fetch_json`]).

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Harvest configuration rejected before any request was made.
    #[error("Invalid harvest configuration: {0}")]
    InvalidConfig(String),

    /// Base URL or endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
