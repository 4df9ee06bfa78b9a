//! Error types for the OGC web service crates.

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Result type alias using OwsError.
pub type OwsResult<T> = Result<T, OwsError>;

/// Primary error type for OWS operations.
#[derive(Debug, Error)]
pub enum OwsError {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    // === Resource Errors ===
    #[error("Out of memory in {0}")]
    Allocation(String),

    // === Protocol Errors ===
    #[error("Protocol error: {0}")]
    Protocol(String),

    // === Collaborator Errors ===
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Failed to write output")]
    Output(#[from] fmt::Error),
}

impl OwsError {
    /// Get the OGC exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            OwsError::Protocol(_) => "InvalidParameterValue",
            OwsError::Projection(_) => "InvalidSRS",
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            OwsError::Protocol(_) => 400,
            OwsError::Allocation(_) => 503,
            _ => 500,
        }
    }
}

impl From<TryReserveError> for OwsError {
    fn from(err: TryReserveError) -> Self {
        OwsError::Allocation(err.to_string())
    }
}
