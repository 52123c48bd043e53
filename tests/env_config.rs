//! Process-environment tests
//!
//! These tests go through `Config::from_input`, which reads the real process
//! environment, so each one runs serially with scoped variables.

use opc_provider::config::{Config, ConfigInput};
use opc_provider::ConfigError;
use serial_test::serial;

const ALL_VARS: [&str; 8] = [
    "OPC_USERNAME",
    "OPC_PASSWORD",
    "OPC_IDENTITY_DOMAIN",
    "OPC_ENDPOINT",
    "OPC_MAX_RETRIES",
    "OPC_INSECURE",
    "OPC_STORAGE_ENDPOINT",
    "OPC_STORAGE_SERVICE_ID",
];

/// Run `f` with every provider variable unset except `set`
fn with_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
    let vars: Vec<(&str, Option<&str>)> = ALL_VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f);
}

#[test]
#[serial]
fn test_credentials_from_process_env() {
    with_env(
        &[
            ("OPC_USERNAME", "env-user"),
            ("OPC_PASSWORD", "env-pass"),
            ("OPC_IDENTITY_DOMAIN", "env-domain"),
            ("OPC_ENDPOINT", "https://api.example.com"),
            ("OPC_MAX_RETRIES", "4"),
            ("OPC_INSECURE", "1"),
        ],
        || {
            let config = Config::from_input(&ConfigInput::default()).unwrap();
            assert_eq!(config.user, "env-user");
            assert_eq!(config.identity_domain, "env-domain");
            assert_eq!(config.endpoint.as_deref(), Some("https://api.example.com"));
            assert_eq!(config.max_retries, 4);
            assert!(config.insecure);
            assert_eq!(config.storage_endpoint, None);
        },
    );
}

#[test]
#[serial]
fn test_missing_everything() {
    with_env(&[], || {
        match Config::from_input(&ConfigInput::default()) {
            Err(ConfigError::MissingRequired(names)) => {
                assert_eq!(names, vec!["user", "password", "identity_domain"]);
            }
            other => panic!("expected MissingRequired, got {:?}", other),
        }
    });
}

#[test]
#[serial]
fn test_flag_overrides_process_env() {
    with_env(
        &[
            ("OPC_USERNAME", "env-user"),
            ("OPC_PASSWORD", "env-pass"),
            ("OPC_IDENTITY_DOMAIN", "env-domain"),
            ("OPC_STORAGE_ENDPOINT", "https://env-storage.example.com"),
        ],
        || {
            let input = ConfigInput {
                user: Some("flag-user".to_string()),
                storage_endpoint: Some("https://flag-storage.example.com".to_string()),
                ..Default::default()
            };
            let config = Config::from_input(&input).unwrap();
            assert_eq!(config.user, "flag-user");
            assert_eq!(config.password, "env-pass");
            assert_eq!(
                config.storage_endpoint.as_deref(),
                Some("https://flag-storage.example.com")
            );
        },
    );
}

#[test]
#[serial]
fn test_invalid_insecure_in_process_env() {
    with_env(
        &[
            ("OPC_USERNAME", "u"),
            ("OPC_PASSWORD", "p"),
            ("OPC_IDENTITY_DOMAIN", "d"),
            ("OPC_INSECURE", "sometimes"),
        ],
        || {
            let err = Config::from_input(&ConfigInput::default()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid value for OPC_INSECURE: expected true or false, got \"sometimes\""
            );
        },
    );
}
