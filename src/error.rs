//! Error types shared across the crate.

use crate::types::SourceId;
use thiserror::Error;

/// Failures raised by store adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Top-level error returned by the CLI and configuration layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Page not found: {0}")]
    PageNotFound(SourceId),

    #[error("Invalid pages file: {0}")]
    InvalidPages(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
