//! The request pipeline every outbound call goes through.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::errors::{classify_status, classify_transport, GatewayError};
use super::rate_limiter::{OperationClass, RateLimiter};
use crate::types::{Error, GatewayConfig, Result};

/// Outcome of a gateway call: the decoded API body, or a normalized failure.
pub type GatewayResult = std::result::Result<Value, GatewayError>;

/// HTTP verbs the botmadang API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Authenticated, rate-limited client for the botmadang API.
///
/// Never fails for a request it attempted: rate-limit blocks, HTTP errors
/// and transport faults all come back as [`GatewayError`] values.
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    credential: String,
    limiter: Arc<RateLimiter>,
}

impl Gateway {
    pub fn new(
        config: &GatewayConfig,
        credential: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(Error::config("API credential cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("botmadang-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
            limiter,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Send one request to `<base_url><path>`.
    ///
    /// Writes tagged `Post`/`Comment` are checked against the rate limiter
    /// first and only advance its timestamp when the API answers with a
    /// success status.
    pub async fn request(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&Value>,
        class: OperationClass,
    ) -> GatewayResult {
        let permit = match self.limiter.acquire(class).await {
            Ok(permit) => permit,
            Err(rejected) => {
                tracing::info!(
                    method = method.as_str(),
                    path,
                    class = %class,
                    "Pre-flight rate limit: {}",
                    rejected
                );
                return Err(rejected);
            }
        };

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method.into(), &url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.credential);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(method = method.as_str(), path, class = %class, "Sending API request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = classify_transport(&e);
                tracing::warn!(method = method.as_str(), path, kind = err.kind(), "API request failed: {}", e);
                return Err(err);
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = classify_transport(&e);
                tracing::warn!(method = method.as_str(), path, status = status.as_u16(), "Failed to read API response: {}", e);
                return Err(err);
            }
        };
        let decoded = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            // Error bodies are best-effort: an undecodable one still yields the status message.
            let body = decoded.unwrap_or(Value::Null);
            let err = classify_status(status.as_u16(), &body, path);
            tracing::warn!(
                method = method.as_str(),
                path,
                status = status.as_u16(),
                kind = err.kind(),
                "API returned error: {}",
                err
            );
            return Err(err);
        }

        let data = match decoded {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(method = method.as_str(), path, status = status.as_u16(), "Undecodable API response: {}", e);
                return Err(GatewayError::Transport(format!("invalid JSON response: {}", e)));
            }
        };

        if let Some(permit) = permit {
            permit.record_success();
            tracing::debug!(class = %class, "Recorded successful write");
        }

        tracing::debug!(method = method.as_str(), path, status = status.as_u16(), "API request succeeded");
        Ok(data)
    }

    /// `GET` with no body and no rate class.
    pub async fn get(&self, path: &str) -> GatewayResult {
        self.request(path, HttpMethod::Get, None, OperationClass::None)
            .await
    }

    /// `POST` with a JSON body.
    pub async fn post(&self, path: &str, body: Option<&Value>, class: OperationClass) -> GatewayResult {
        self.request(path, HttpMethod::Post, body, class).await
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .field("limiter", &self.limiter)
            .finish()
    }
}

/// Collapse a gateway outcome into the JSON value handed back to tools.
pub fn outcome_value(result: GatewayResult) -> Value {
    match result {
        Ok(value) => value,
        Err(err) => err.to_value(),
    }
}
