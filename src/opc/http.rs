//! HTTP utilities for OPC REST API calls

use crate::error::ApiError;
use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Delay between attempts, multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

const USER_AGENT: &str = concat!("opc-provider/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Whether a response status is worth another attempt
fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// HTTP client wrapper shared by the compute and storage clients
#[derive(Clone)]
pub struct OpcHttpClient {
    client: Client,
    max_retries: u32,
}

impl OpcHttpClient {
    /// Create a new HTTP client
    ///
    /// `insecure` disables TLS certificate verification. `max_retries` is the
    /// total number of attempts per request; zero is treated as one.
    pub fn new(insecure: bool, max_retries: u32) -> Result<Self> {
        if insecure {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(insecure)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: max_retries.max(1),
        })
    }

    /// Access the underlying reqwest client for building requests
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send a request, retrying transport errors and 5xx/429 responses
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;

        loop {
            // Streaming bodies cannot be cloned; those get a single attempt
            let Some(current) = request.try_clone() else {
                return request.send().await.context("Failed to send request");
            };

            match current.send().await {
                Ok(response) if is_retryable(response.status()) && attempt < self.max_retries => {
                    tracing::warn!(
                        "Attempt {}/{} returned {}, retrying",
                        attempt,
                        self.max_retries,
                        response.status()
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    tracing::warn!(
                        "Attempt {}/{} failed: {}, retrying",
                        attempt,
                        self.max_retries,
                        e
                    );
                }
                Err(e) => return Err(e).context("Failed to send request"),
            }

            tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            attempt += 1;
        }
    }

    /// Send a request and return the response if its status is successful
    pub async fn execute_checked(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        Err(ApiError { status }.into())
    }

    /// Make a GET request and parse the JSON body
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .execute_checked(self.client.get(url).headers(headers))
            .await?;

        read_json(response).await
    }

    /// Make a HEAD request and return the response headers
    pub async fn head(&self, url: &str, headers: HeaderMap) -> Result<HeaderMap> {
        tracing::debug!("HEAD {}", url);

        let response = self
            .execute_checked(self.client.head(url).headers(headers))
            .await?;

        Ok(response.headers().clone())
    }
}

/// Read a response body as JSON, mapping an empty body to `Null`
async fn read_json(response: Response) -> Result<Value> {
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).context("Failed to parse response JSON")
}

/// HTTP status of the first [`ApiError`] in an error chain
pub fn api_status(error: &anyhow::Error) -> Option<StatusCode> {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<ApiError>())
        .map(|e| e.status)
}

/// Format an OPC API error for display
///
/// Known API statuses get a short hint; everything else is shown with its
/// full context chain.
pub fn format_opc_error(error: &anyhow::Error) -> String {
    let hint = match api_status(error) {
        Some(StatusCode::UNAUTHORIZED) => {
            "Authentication failed. Check user, password and identity_domain."
        }
        Some(StatusCode::FORBIDDEN) => "Permission denied. Check the roles granted to this user.",
        Some(StatusCode::NOT_FOUND) => "Resource not found.",
        Some(StatusCode::TOO_MANY_REQUESTS) => "Rate limit exceeded. Please try again later.",
        Some(StatusCode::BAD_REQUEST) => "Invalid request. Check your parameters.",
        Some(StatusCode::CONFLICT) => {
            "Resource conflict. The resource may already exist or be in use."
        }
        Some(status) if status.is_server_error() => {
            "OPC service temporarily unavailable. Please try again."
        }
        _ => return format!("{:#}", error),
    };

    format!("{}: {}", error, hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("truncated, 500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let http = OpcHttpClient::new(false, 0).unwrap();
        assert_eq!(http.max_retries, 1);
    }

    fn api_error(status: StatusCode) -> anyhow::Error {
        ApiError { status }.into()
    }

    #[test]
    fn test_format_opc_error_maps_typed_status() {
        let err =
            api_error(StatusCode::UNAUTHORIZED).context("Failed to authenticate compute client");
        assert_eq!(
            format_opc_error(&err),
            "Failed to authenticate compute client: Authentication failed. Check user, password and identity_domain."
        );

        let err = api_error(StatusCode::SERVICE_UNAVAILABLE);
        assert!(format_opc_error(&err).ends_with("temporarily unavailable. Please try again."));
    }

    #[test]
    fn test_format_opc_error_ignores_digits_in_names() {
        let err = api_error(StatusCode::NOT_FOUND)
            .context("Failed to read opc_compute_instance web-401");
        assert_eq!(
            format_opc_error(&err),
            "Failed to read opc_compute_instance web-401: Resource not found."
        );

        let err = anyhow::anyhow!("no route to 10.0.0.500").context("Failed to read vnic-404");
        assert_eq!(
            format_opc_error(&err),
            "Failed to read vnic-404: no route to 10.0.0.500"
        );
    }

    #[test]
    fn test_format_opc_error_keeps_full_chain() {
        let cause = "error sending request for url (https://192.168.140.1/authenticate/): connection refused";
        let err = anyhow::anyhow!(cause)
            .context("Failed to send request")
            .context("Failed to authenticate compute client");
        assert_eq!(
            format_opc_error(&err),
            format!(
                "Failed to authenticate compute client: Failed to send request: {}",
                cause
            )
        );
    }

    #[test]
    fn test_unmapped_status_prints_chain() {
        let err = api_error(StatusCode::IM_A_TEAPOT).context("Failed to list opc_compute_vnic");
        assert_eq!(
            format_opc_error(&err),
            "Failed to list opc_compute_vnic: API request failed: 418 I'm a teapot"
        );
        assert_eq!(api_status(&err), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(api_status(&anyhow::anyhow!("plain")), None);
    }
}
