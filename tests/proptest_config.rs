//! Property-based tests using proptest
//!
//! These tests check configuration resolution against randomized explicit
//! values and environment contents.

use opc_provider::config::{Config, ConfigInput};
use opc_provider::provider::schema::{required_options, PROVIDER_OPTIONS};
use opc_provider::ConfigError;
use proptest::prelude::*;
use std::collections::HashMap;

/// Non-empty setting values
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._:/-]{1,24}"
}

fn arb_credentials() -> impl Strategy<Value = (String, String, String)> {
    (arb_value(), arb_value(), arb_value())
}

fn input_with(user: &str, password: &str, domain: &str) -> ConfigInput {
    ConfigInput {
        user: Some(user.to_string()),
        password: Some(password.to_string()),
        identity_domain: Some(domain.to_string()),
        ..Default::default()
    }
}

/// Environment holding every option
fn full_env(values: &[String; 8]) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for (opt, value) in PROVIDER_OPTIONS.iter().zip(values.iter()) {
        env.insert(opt.env_var.to_string(), value.clone());
    }
    env.insert("OPC_MAX_RETRIES".to_string(), "9".to_string());
    env.insert("OPC_INSECURE".to_string(), "true".to_string());
    env
}

fn arb_env_values() -> impl Strategy<Value = [String; 8]> {
    prop::array::uniform8(arb_value())
}

proptest! {
    /// Omitting any required option (explicitly and in the environment) fails
    #[test]
    fn missing_required_fails(
        (user, password, domain) in arb_credentials(),
        drop in 0usize..3,
    ) {
        let mut input = input_with(&user, &password, &domain);
        match drop {
            0 => input.user = None,
            1 => input.password = None,
            _ => input.identity_domain = None,
        }

        let result = Config::resolve(&input, &HashMap::<String, String>::new());
        let expected = required_options().nth(drop).map(|opt| opt.name);
        match result {
            Err(ConfigError::MissingRequired(names)) => {
                prop_assert_eq!(names.len(), 1);
                prop_assert_eq!(Some(names[0]), expected);
            }
            other => prop_assert!(false, "expected MissingRequired, got {:?}", other),
        }
    }

    /// Optional options fall back to their static defaults
    #[test]
    fn optional_defaults((user, password, domain) in arb_credentials()) {
        let config = Config::resolve(
            &input_with(&user, &password, &domain),
            &HashMap::<String, String>::new(),
        ).unwrap();

        prop_assert_eq!(config.max_retries, 1);
        prop_assert!(!config.insecure);
        prop_assert_eq!(config.endpoint, None);
        prop_assert_eq!(config.storage_endpoint, None);
        prop_assert_eq!(config.storage_service_id, None);
    }

    /// Explicit values win over every environment variable
    #[test]
    fn explicit_beats_env(
        (user, password, domain) in arb_credentials(),
        endpoint in arb_value(),
        storage_endpoint in arb_value(),
        retries in 0u32..100,
        insecure in any::<bool>(),
        env_values in arb_env_values(),
    ) {
        let input = ConfigInput {
            endpoint: Some(endpoint.clone()),
            max_retries: Some(retries),
            insecure: Some(insecure),
            storage_endpoint: Some(storage_endpoint.clone()),
            storage_service_id: Some("explicit-id".to_string()),
            ..input_with(&user, &password, &domain)
        };

        let config = Config::resolve(&input, &full_env(&env_values)).unwrap();

        prop_assert_eq!(config.user, user);
        prop_assert_eq!(config.password, password);
        prop_assert_eq!(config.identity_domain, domain);
        prop_assert_eq!(config.endpoint, Some(endpoint));
        prop_assert_eq!(config.max_retries, retries);
        prop_assert_eq!(config.insecure, insecure);
        prop_assert_eq!(config.storage_endpoint, Some(storage_endpoint));
        prop_assert_eq!(config.storage_service_id.as_deref(), Some("explicit-id"));
    }

    /// With no explicit values, every option comes from the environment
    #[test]
    fn env_fills_unset(env_values in arb_env_values()) {
        let env = full_env(&env_values);
        let config = Config::resolve(&ConfigInput::default(), &env).unwrap();

        prop_assert_eq!(&config.user, &env_values[0]);
        prop_assert_eq!(&config.password, &env_values[1]);
        prop_assert_eq!(&config.identity_domain, &env_values[2]);
        prop_assert_eq!(config.endpoint.as_ref(), Some(&env_values[3]));
        prop_assert_eq!(config.max_retries, 9);
        prop_assert!(config.insecure);
        prop_assert_eq!(config.storage_endpoint.as_ref(), Some(&env_values[6]));
        prop_assert_eq!(config.storage_service_id.as_ref(), Some(&env_values[7]));
    }

    /// Resolving twice with identical inputs yields identical configurations
    #[test]
    fn resolution_is_idempotent(
        (user, password, domain) in arb_credentials(),
        env_values in arb_env_values(),
        use_env in any::<bool>(),
    ) {
        let input = input_with(&user, &password, &domain);
        let env = if use_env { full_env(&env_values) } else { HashMap::new() };

        let first = Config::resolve(&input, &env).unwrap();
        let second = Config::resolve(&input, &env).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn minimal_credentials_example() {
    let config = Config::resolve(&input_with("a", "b", "c"), &HashMap::<String, String>::new())
        .expect("minimal credentials should resolve");
    assert_eq!(config.max_retries, 1);
    assert!(!config.insecure);
}
