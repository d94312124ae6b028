//! Error handling and custom error types
//!
//! Provides unified error handling across the commands using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error (status {status}): {body}")]
    Storage { status: u16, body: String },

    #[error("Failed to read response body: {0}")]
    BodyRead(String),
}

impl Error {
    /// Whether the fixed retry policy should try the request again.
    pub fn is_transient(&self, retry_statuses: &[u16]) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Storage { status, .. } => retry_statuses.contains(status),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
