//! Configuration Resolution
//!
//! Turns explicit provider settings into an immutable [`Config`]. Each option
//! resolves as: explicit value, else its environment variable, else the
//! static default from [`crate::provider::schema`], else absent.
//!
//! Resolution only reads the supplied [`EnvSource`]; no network or file I/O
//! happens until [`Config::client`] is called.

use crate::error::ConfigError;
use crate::opc::client::OpcClient;
use crate::provider::schema::{
    get_option, OptionKind, ENDPOINT, IDENTITY_DOMAIN, INSECURE, MAX_RETRIES, PASSWORD, STORAGE_ENDPOINT,
    STORAGE_SERVICE_ID, USER,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Source of environment values
pub trait EnvSource {
    /// Value of `key`, or `None` when unset
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Explicitly provided settings (the provider block)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigInput {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub identity_domain: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub insecure: Option<bool>,
    #[serde(default)]
    pub storage_endpoint: Option<String>,
    #[serde(default)]
    pub storage_service_id: Option<String>,
}

impl ConfigInput {
    /// Load a provider block from a JSON or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider config {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML provider config {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON provider config {}", path.display()))
        }
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: ConfigInput) -> Self {
        Self {
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
            identity_domain: self.identity_domain.or(fallback.identity_domain),
            endpoint: self.endpoint.or(fallback.endpoint),
            max_retries: self.max_retries.or(fallback.max_retries),
            insecure: self.insecure.or(fallback.insecure),
            storage_endpoint: self.storage_endpoint.or(fallback.storage_endpoint),
            storage_service_id: self.storage_service_id.or(fallback.storage_service_id),
        }
    }
}

/// Resolved provider configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub identity_domain: String,
    pub endpoint: Option<String>,
    pub max_retries: u32,
    pub insecure: bool,
    pub storage_endpoint: Option<String>,
    pub storage_service_id: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"***")
            .field("identity_domain", &self.identity_domain)
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("insecure", &self.insecure)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("storage_service_id", &self.storage_service_id)
            .finish()
    }
}

impl Config {
    /// Resolve explicit settings against the process environment
    pub fn from_input(input: &ConfigInput) -> Result<Self, ConfigError> {
        Self::resolve(input, &ProcessEnv)
    }

    /// Resolve explicit settings against `env`
    pub fn resolve(input: &ConfigInput, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let user = resolve_string(USER, input.user.as_deref(), env);
        let password = resolve_string(PASSWORD, input.password.as_deref(), env);
        let identity_domain = resolve_string(IDENTITY_DOMAIN, input.identity_domain.as_deref(), env);

        let missing: Vec<&'static str> = [
            (USER, &user),
            (PASSWORD, &password),
            (IDENTITY_DOMAIN, &identity_domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect();

        let (Some(user), Some(password), Some(identity_domain)) = (user, password, identity_domain)
        else {
            tracing::warn!("Provider configuration is missing {:?}", missing);
            return Err(ConfigError::MissingRequired(missing));
        };

        let max_retries = match input.max_retries {
            Some(value) => value,
            None => resolve_typed(MAX_RETRIES, env, parse_retries)?.unwrap_or(1),
        };

        let insecure = match input.insecure {
            Some(value) => value,
            None => resolve_typed(INSECURE, env, parse_bool)?.unwrap_or(false),
        };

        let config = Self {
            user,
            password,
            identity_domain,
            endpoint: resolve_string(ENDPOINT, input.endpoint.as_deref(), env),
            max_retries,
            insecure,
            storage_endpoint: resolve_string(
                STORAGE_ENDPOINT,
                input.storage_endpoint.as_deref(),
                env,
            ),
            storage_service_id: resolve_string(
                STORAGE_SERVICE_ID,
                input.storage_service_id.as_deref(),
                env,
            ),
        };

        tracing::debug!("Resolved provider configuration: {:?}", config);

        Ok(config)
    }

    /// Build an authenticated client from this configuration
    pub async fn client(self) -> Result<OpcClient, ConfigError> {
        OpcClient::new(self).await
    }

    /// Compute account prefix: `/Compute-{identity_domain}`
    pub fn compute_account(&self) -> String {
        format!("/Compute-{}", self.identity_domain)
    }

    /// Fully qualified compute user: `/Compute-{identity_domain}/{user}`
    pub fn compute_user(&self) -> String {
        format!("{}/{}", self.compute_account(), self.user)
    }

    /// Storage account name; the service ID replaces the identity domain when set
    pub fn storage_account(&self) -> String {
        let id = self
            .storage_service_id
            .as_deref()
            .unwrap_or(&self.identity_domain);
        format!("Storage-{}", id)
    }

    /// Display form with the password masked
    pub fn redacted(&self) -> Value {
        json!({
            "user": self.user,
            "password": "***",
            "identity_domain": self.identity_domain,
            "endpoint": self.endpoint,
            "max_retries": self.max_retries,
            "insecure": self.insecure,
            "storage_endpoint": self.storage_endpoint,
            "storage_service_id": self.storage_service_id,
        })
    }
}

/// Raw fallback value for an option: environment first, then static default.
/// Empty environment values count as unset.
fn fallback(name: &str, env: &dyn EnvSource) -> Option<(String, &'static str)> {
    let opt = get_option(name)?;

    if let Some(value) = env.var(opt.env_var).filter(|v| !v.is_empty()) {
        return Some((value, opt.env_var));
    }

    opt.default.map(|value| (value.to_string(), opt.name))
}

/// Resolve a string option. An explicit value wins even when empty; empty
/// results resolve to `None`.
fn resolve_string(name: &str, explicit: Option<&str>, env: &dyn EnvSource) -> Option<String> {
    let value = match explicit {
        Some(value) => value.to_string(),
        None => fallback(name, env)?.0,
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn resolve_typed<T>(
    name: &str,
    env: &dyn EnvSource,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    let Some((raw, origin)) = fallback(name, env) else {
        return Ok(None);
    };

    parse(raw.trim())
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            var: origin.to_string(),
            message: match get_option(name).map(|opt| opt.kind) {
                Some(OptionKind::Bool) => {
                    format!("expected true or false, got {:?}", raw)
                }
                _ => format!("expected a non-negative integer, got {:?}", raw),
            },
        })
}

fn parse_retries(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

/// Boolean spellings accepted for environment values
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
