//! Provider Schema
//!
//! Declarative table of every option the provider block accepts. The
//! resolver in [`crate::config`] walks this table, so adding an option here
//! is enough to give it an environment fallback and a default.

use serde::Serialize;

/// Value type of a provider option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    String,
    Int,
    Bool,
}

/// One provider option
#[derive(Debug, Clone, Serialize)]
pub struct OptionSchema {
    pub name: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    /// Environment variable consulted when no explicit value is given
    pub env_var: &'static str,
    /// Static default, in the same textual form as the environment value
    pub default: Option<&'static str>,
    pub description: &'static str,
}

pub const USER: &str = "user";
pub const PASSWORD: &str = "password";
pub const IDENTITY_DOMAIN: &str = "identity_domain";
pub const ENDPOINT: &str = "endpoint";
pub const MAX_RETRIES: &str = "max_retries";
pub const INSECURE: &str = "insecure";
pub const STORAGE_ENDPOINT: &str = "storage_endpoint";
pub const STORAGE_SERVICE_ID: &str = "storage_service_id";

/// All provider options, in declaration order
pub const PROVIDER_OPTIONS: &[OptionSchema] = &[
    OptionSchema {
        name: USER,
        kind: OptionKind::String,
        required: true,
        env_var: "OPC_USERNAME",
        default: None,
        description: "The user name for OPC API operations.",
    },
    OptionSchema {
        name: PASSWORD,
        kind: OptionKind::String,
        required: true,
        env_var: "OPC_PASSWORD",
        default: None,
        description: "The user password for OPC API operations.",
    },
    OptionSchema {
        name: IDENTITY_DOMAIN,
        kind: OptionKind::String,
        required: true,
        env_var: "OPC_IDENTITY_DOMAIN",
        default: None,
        description: "The OPC identity domain for API operations",
    },
    OptionSchema {
        name: ENDPOINT,
        kind: OptionKind::String,
        required: false,
        env_var: "OPC_ENDPOINT",
        default: None,
        description: "The HTTP endpoint for OPC API operations.",
    },
    OptionSchema {
        name: MAX_RETRIES,
        kind: OptionKind::Int,
        required: false,
        env_var: "OPC_MAX_RETRIES",
        default: Some("1"),
        description: "Maximum number retries to wait for a successful response when operating on resources within OPC (defaults to 1)",
    },
    OptionSchema {
        name: INSECURE,
        kind: OptionKind::Bool,
        required: false,
        env_var: "OPC_INSECURE",
        default: Some("false"),
        description: "Skip TLS Verification for self-signed certificates. Should only be used if absolutely required.",
    },
    OptionSchema {
        name: STORAGE_ENDPOINT,
        kind: OptionKind::String,
        required: false,
        env_var: "OPC_STORAGE_ENDPOINT",
        default: None,
        description: "The HTTP endpoint for Oracle Storage operations.",
    },
    OptionSchema {
        name: STORAGE_SERVICE_ID,
        kind: OptionKind::String,
        required: false,
        env_var: "OPC_STORAGE_SERVICE_ID",
        default: None,
        description: "The Storage Service ID.",
    },
];

/// Look up an option by name
pub fn get_option(name: &str) -> Option<&'static OptionSchema> {
    PROVIDER_OPTIONS.iter().find(|opt| opt.name == name)
}

/// Names of the options that must resolve to a value
pub fn required_options() -> impl Iterator<Item = &'static OptionSchema> {
    PROVIDER_OPTIONS.iter().filter(|opt| opt.required)
}
