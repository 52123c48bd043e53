//! Oracle Public Cloud provider
//!
//! Resolves provider settings (explicit value, environment variable, static
//! default), authenticates against the compute and storage APIs, and exposes
//! the catalog of resource and data-source types.

pub mod config;
pub mod error;
pub mod opc;
pub mod provider;
pub mod resource;

pub use config::{Config, ConfigInput, EnvSource, ProcessEnv};
pub use error::{ApiError, ConfigError};
pub use opc::client::OpcClient;
pub use provider::Provider;
