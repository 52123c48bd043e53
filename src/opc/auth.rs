//! OPC Authentication
//!
//! Compute uses a session cookie obtained by posting the qualified user name
//! and password to `/authenticate/`. Storage uses a Swift-style token from
//! `/auth/v1.0`. Both are cached and re-fetched shortly before they expire.

use super::http::OpcHttpClient;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, SET_COOKIE};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Media type of the compute API
pub const COMPUTE_CONTENT_TYPE: &str = "application/oracle-compute-v3+json";

/// Header carrying the storage auth token on every storage request
pub const STORAGE_AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Refresh sessions this much before they actually expire
const SESSION_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Lifetime of a compute cookie or storage token
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
struct CachedSession {
    value: String,
    /// When this session expires (with buffer applied)
    expires_at: Instant,
}

impl CachedSession {
    fn new(value: String) -> Self {
        Self {
            value,
            expires_at: Instant::now() + DEFAULT_SESSION_TTL - SESSION_EXPIRY_BUFFER,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Compute API credentials with session-cookie caching
#[derive(Clone)]
pub struct ComputeCredentials {
    http: OpcHttpClient,
    auth_url: String,
    qualified_user: String,
    password: String,
    cache: Arc<RwLock<Option<CachedSession>>>,
}

impl ComputeCredentials {
    /// `qualified_user` has the form `/Compute-{identity_domain}/{user}`
    pub fn new(http: OpcHttpClient, endpoint: &str, qualified_user: String, password: String) -> Self {
        Self {
            http,
            auth_url: format!("{}/authenticate/", endpoint),
            qualified_user,
            password,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the session cookie, authenticating when none is cached or it expired
    pub async fn get_cookie(&self) -> Result<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.value.clone());
                }
                tracing::debug!("Compute session expired, re-authenticating");
            }
        }

        let cookie = self.authenticate().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedSession::new(cookie.clone()));
        }

        Ok(cookie)
    }

    /// Drop the cached session and authenticate again
    pub async fn refresh(&self) -> Result<String> {
        {
            let mut cache = self.cache.write().await;
            *cache = None;
        }

        self.get_cookie().await
    }

    async fn authenticate(&self) -> Result<String> {
        tracing::info!("Authenticating compute user {}", self.qualified_user);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(COMPUTE_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(COMPUTE_CONTENT_TYPE));

        let body = json!({
            "user": self.qualified_user,
            "password": self.password,
        });

        let request = self
            .http
            .inner()
            .post(&self.auth_url)
            .headers(headers)
            .body(body.to_string());

        let response = self.http.execute_checked(request).await?;

        session_cookie(response.headers())
            .context("Authentication response did not include a session cookie")
    }
}

/// First `name=value` pair of the `Set-Cookie` response headers
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .find(|pair| pair.contains('='))
        .map(str::to_string)
}

/// Storage token and the account URL it is valid for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageSession {
    pub token: String,
    pub storage_url: String,
}

/// Storage API credentials with token caching
#[derive(Clone)]
pub struct StorageCredentials {
    http: OpcHttpClient,
    endpoint: String,
    account: String,
    user: String,
    password: String,
    cache: Arc<RwLock<Option<(CachedSession, String)>>>,
}

impl StorageCredentials {
    /// `account` has the form `Storage-{service id or identity domain}`
    pub fn new(
        http: OpcHttpClient,
        endpoint: &str,
        account: String,
        user: String,
        password: String,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            account,
            user,
            password,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a storage session, authenticating when none is cached or it expired
    pub async fn get_session(&self) -> Result<StorageSession> {
        {
            let cache = self.cache.read().await;
            if let Some((cached, storage_url)) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(StorageSession {
                        token: cached.value.clone(),
                        storage_url: storage_url.clone(),
                    });
                }
                tracing::debug!("Storage token expired, re-authenticating");
            }
        }

        let session = self.authenticate().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some((
                CachedSession::new(session.token.clone()),
                session.storage_url.clone(),
            ));
        }

        Ok(session)
    }

    async fn authenticate(&self) -> Result<StorageSession> {
        let storage_user = format!("{}:{}", self.account, self.user);
        tracing::info!("Authenticating storage user {}", storage_user);

        let request = self
            .http
            .inner()
            .get(format!("{}/auth/v1.0", self.endpoint))
            .header("X-Storage-User", storage_user)
            .header("X-Storage-Pass", &self.password);

        let response = self.http.execute_checked(request).await?;
        let headers = response.headers();

        let token = headers
            .get(STORAGE_AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("Storage authentication response did not include X-Auth-Token")?;

        let storage_url = headers
            .get("X-Storage-Url")
            .and_then(|v| v.to_str().ok())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/v1/{}", self.endpoint, self.account));

        Ok(StorageSession { token, storage_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_takes_first_pair() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("nimbula=abc123; Path=/; Max-Age=1800"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("nimbula=abc123"));
    }

    #[test]
    fn test_session_cookie_missing() {
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cached_session_is_valid_when_fresh() {
        assert!(CachedSession::new("x".to_string()).is_valid());
    }
}
