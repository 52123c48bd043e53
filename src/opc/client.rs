//! OPC Client
//!
//! The client built from a resolved [`Config`]: a compute client that is
//! always present and a storage client that exists only when a storage
//! endpoint was configured.

use super::auth::{
    ComputeCredentials, StorageCredentials, COMPUTE_CONTENT_TYPE, STORAGE_AUTH_TOKEN_HEADER,
};
use super::http::{api_status, OpcHttpClient};
use crate::config::Config;
use crate::error::ConfigError;
use crate::provider::schema::{ENDPOINT, STORAGE_ENDPOINT};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, COOKIE};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

/// Validate an endpoint option and return it without a trailing slash
pub fn parse_endpoint(option: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    let Some(value) = value else {
        return Err(ConfigError::InvalidEndpoint {
            option,
            message: format!(
                "`{}` is not set; configure it in the provider block or its environment variable",
                option
            ),
        });
    };

    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        option,
        message: format!("{} ({})", e, value),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint {
            option,
            message: format!("expected an absolute http(s) URL, got {}", value),
        });
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Compute API client
#[derive(Clone)]
pub struct ComputeClient {
    http: OpcHttpClient,
    credentials: ComputeCredentials,
    endpoint: String,
    /// `/Compute-{identity_domain}/{user}`
    qualified_user: String,
}

impl ComputeClient {
    /// Qualify a short object name with the account and user; names that
    /// already start with `/` are returned unchanged
    pub fn qualify(&self, name: &str) -> String {
        if name.starts_with('/') {
            name.to_string()
        } else {
            format!("{}/{}", self.qualified_user, name)
        }
    }

    /// URL of a single object under `path`
    pub fn object_url(&self, path: &str, name: &str) -> String {
        format!("{}{}{}", self.endpoint, path, self.qualify(name))
    }

    /// URL listing every object the user owns under `path`
    pub fn container_url(&self, path: &str) -> String {
        format!("{}{}{}/", self.endpoint, path, self.qualified_user)
    }

    fn headers(&self, cookie: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(COMPUTE_CONTENT_TYPE));
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie).context("Session cookie is not a valid header value")?,
        );
        Ok(headers)
    }

    /// Make an authenticated GET request; an expired session is renewed once
    pub async fn get(&self, url: &str) -> Result<Value> {
        let cookie = self.credentials.get_cookie().await?;
        let headers = self.headers(&cookie)?;

        match self.http.get(url, headers).await {
            Err(e) if api_status(&e) == Some(StatusCode::UNAUTHORIZED) => {
                tracing::debug!("Compute request unauthorized, refreshing session");
                let cookie = self.credentials.refresh().await?;
                let headers = self.headers(&cookie)?;
                self.http.get(url, headers).await
            }
            result => result,
        }
    }
}

/// Storage API client
#[derive(Clone)]
pub struct StorageClient {
    http: OpcHttpClient,
    credentials: StorageCredentials,
}

impl StorageClient {
    async fn headers(&self) -> Result<(HeaderMap, String)> {
        let session = self.credentials.get_session().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-auth-token"),
            HeaderValue::from_str(&session.token)
                .with_context(|| format!("{} is not a valid header value", STORAGE_AUTH_TOKEN_HEADER))?,
        );
        Ok((headers, session.storage_url))
    }

    /// Account URL returned by storage authentication
    pub async fn storage_url(&self) -> Result<String> {
        Ok(self.credentials.get_session().await?.storage_url)
    }

    /// GET `{storage_url}/{path}?format=json`
    pub async fn get(&self, path: &str) -> Result<Value> {
        let (headers, storage_url) = self.headers().await?;
        let url = if path.is_empty() {
            format!("{}?format=json", storage_url)
        } else {
            format!("{}/{}?format=json", storage_url, path)
        };
        self.http.get(&url, headers).await
    }

    /// HEAD `{storage_url}/{path}`, returning the metadata headers as JSON
    pub async fn head(&self, path: &str) -> Result<Value> {
        let (headers, storage_url) = self.headers().await?;
        let url = format!("{}/{}", storage_url, path);
        let response_headers = self.http.head(&url, headers).await?;

        let map: Map<String, Value> = response_headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();

        Ok(Value::Object(map))
    }
}

/// Authenticated OPC client
#[derive(Clone)]
pub struct OpcClient {
    compute: ComputeClient,
    storage: Option<StorageClient>,
}

impl OpcClient {
    /// Build and authenticate a client. Consumes the configuration.
    pub async fn new(config: Config) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(ENDPOINT, config.endpoint.as_deref())?;
        let storage_endpoint = config
            .storage_endpoint
            .as_deref()
            .map(|value| parse_endpoint(STORAGE_ENDPOINT, Some(value)))
            .transpose()?;

        let http = OpcHttpClient::new(config.insecure, config.max_retries)?;

        let credentials = ComputeCredentials::new(
            http.clone(),
            &endpoint,
            config.compute_user(),
            config.password.clone(),
        );
        credentials
            .get_cookie()
            .await
            .context("Failed to authenticate compute client")?;

        let compute = ComputeClient {
            http: http.clone(),
            credentials,
            endpoint,
            qualified_user: config.compute_user(),
        };

        let storage = match storage_endpoint {
            Some(storage_endpoint) => {
                let credentials = StorageCredentials::new(
                    http.clone(),
                    &storage_endpoint,
                    config.storage_account(),
                    config.user.clone(),
                    config.password.clone(),
                );
                credentials
                    .get_session()
                    .await
                    .context("Failed to authenticate storage client")?;
                Some(StorageClient { http, credentials })
            }
            None => {
                tracing::debug!("No storage endpoint configured, storage client disabled");
                None
            }
        };

        tracing::info!(
            "OPC client ready for {} (attempts per request: {}, storage: {})",
            compute.endpoint,
            config.max_retries.max(1),
            storage.is_some()
        );

        Ok(Self { compute, storage })
    }

    pub fn compute(&self) -> &ComputeClient {
        &self.compute
    }

    /// Storage client; fails when no storage endpoint was configured
    pub fn storage(&self) -> Result<&StorageClient, ConfigError> {
        self.storage.as_ref().ok_or(ConfigError::StorageNotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_trims_trailing_slash() {
        let endpoint = parse_endpoint(ENDPOINT, Some("https://api.example.com/")).unwrap();
        assert_eq!(endpoint, "https://api.example.com");
    }

    #[test]
    fn test_parse_endpoint_missing() {
        let err = parse_endpoint(ENDPOINT, None).unwrap_err();
        assert!(err.to_string().contains("`endpoint` is not set"));
    }

    #[test]
    fn test_parse_endpoint_rejects_relative_and_non_http() {
        assert!(matches!(
            parse_endpoint(ENDPOINT, Some("api.example.com")),
            Err(ConfigError::InvalidEndpoint { option: "endpoint", .. })
        ));
        assert!(parse_endpoint(STORAGE_ENDPOINT, Some("ftp://files.example.com")).is_err());
    }
}
