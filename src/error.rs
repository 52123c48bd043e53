//! Configuration errors
//!
//! Every failure between reading provider settings and holding an
//! authenticated client is a [`ConfigError`]. Operations on an already
//! configured client use `anyhow` instead, carrying an [`ApiError`] when the
//! failure was an HTTP status.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when a storage capability is used without a storage endpoint
pub const STORAGE_CLIENT_INIT_ERROR: &str = "Storage client is not initialized. Make sure to use `storage_endpoint` variable or the `OPC_STORAGE_ENDPOINT` environment variable";

/// Errors raised while resolving configuration or building the client
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required options resolved to nothing
    #[error("Missing required configuration: {}", format_missing(.0))]
    MissingRequired(Vec<&'static str>),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Invalid {option} URI: {message}")]
    InvalidEndpoint {
        option: &'static str,
        message: String,
    },

    #[error("{}", STORAGE_CLIENT_INIT_ERROR)]
    StorageNotConfigured,

    /// Client construction failed after the configuration was resolved
    #[error(transparent)]
    Client(#[from] anyhow::Error),
}

/// Non-success status returned by an OPC API
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("API request failed: {status}")]
pub struct ApiError {
    pub status: StatusCode,
}

fn format_missing(names: &[&'static str]) -> String {
    names
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ")
}
