//! Provider definition
//!
//! Ties the option schema, the capability catalog and the configure step
//! together, the way a plugin host sees the provider.

pub mod schema;

use crate::config::{Config, ConfigInput, EnvSource, ProcessEnv};
use crate::error::ConfigError;
use crate::opc::client::OpcClient;
use crate::resource::{self, CapabilityDef};
use schema::{OptionSchema, PROVIDER_OPTIONS};

/// The OPC provider
#[derive(Debug, Clone, Copy, Default)]
pub struct Provider;

impl Provider {
    pub fn new() -> Self {
        Self
    }

    /// Options accepted in the provider block
    pub fn schema(&self) -> &'static [OptionSchema] {
        PROVIDER_OPTIONS
    }

    /// Constructor for a resource type, if registered
    pub fn resource(&self, key: &str) -> Option<&'static CapabilityDef> {
        resource::get_resource(key)
    }

    /// Constructor for a data source type, if registered
    pub fn data_source(&self, key: &str) -> Option<&'static CapabilityDef> {
        resource::get_data_source(key)
    }

    /// Resolve `input` against the process environment and build the client
    pub async fn configure(&self, input: &ConfigInput) -> Result<OpcClient, ConfigError> {
        self.configure_with_env(input, &ProcessEnv).await
    }

    /// Resolve `input` against `env` and build the client
    pub async fn configure_with_env(
        &self,
        input: &ConfigInput,
        env: &dyn EnvSource,
    ) -> Result<OpcClient, ConfigError> {
        let config = Config::resolve(input, env)?;
        config.client().await
    }
}
