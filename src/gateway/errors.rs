//! Gateway failure taxonomy and classification.
//!
//! Every failure the gateway can produce is a [`GatewayError`]; its `Display`
//! text is the user-facing message placed in `{"success": false, "error": ...}`.

use serde_json::{json, Value};
use thiserror::Error;

use super::rate_limiter::OperationClass;

/// Normalized failure of an outbound call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Pre-flight rejection: the class interval has not elapsed.
    #[error("{} 제한: {wait_secs}초 후에 다시 시도해주세요.", .class.label())]
    RateLimited {
        class: OperationClass,
        wait_secs: u64,
    },

    /// HTTP 401.
    #[error("인증 실패: BOTMADANG_API_KEY를 확인하세요.")]
    Unauthorized,

    /// HTTP 404.
    #[error("리소스를 찾을 수 없습니다: {path}")]
    NotFound { path: String },

    /// HTTP 429 from the server.
    #[error("요청 한도 초과. {}", .hint.as_deref().unwrap_or("잠시 후 다시 시도해주세요."))]
    ServerRateLimited { hint: Option<String> },

    /// Any other non-success status.
    #[error("API 오류 ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection refused or host not resolvable.
    #[error("봇마당 서버에 연결할 수 없습니다.")]
    Unreachable,

    /// Any other transport fault, or an undecodable success body.
    #[error("요청 실패: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Render as the `{success: false, error}` result shape.
    pub fn to_value(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
        })
    }

    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::Unauthorized => "unauthorized",
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::ServerRateLimited { .. } => "server_rate_limited",
            GatewayError::Api { .. } => "api_error",
            GatewayError::Unreachable => "unreachable",
            GatewayError::Transport(_) => "transport",
        }
    }
}

/// Text of a loosely-typed body field; strings verbatim, other values as JSON.
fn field_text(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Classify a non-success HTTP status into a gateway failure.
pub fn classify_status(status: u16, body: &Value, path: &str) -> GatewayError {
    match status {
        401 => GatewayError::Unauthorized,
        404 => GatewayError::NotFound {
            path: path.to_string(),
        },
        429 => GatewayError::ServerRateLimited {
            hint: field_text(body, "hint"),
        },
        _ => GatewayError::Api {
            status,
            message: field_text(body, "error").unwrap_or_else(|| "알 수 없는 오류".to_string()),
        },
    }
}

const UNREACHABLE_SIGNATURES: &[&str] = &[
    "connection refused",
    "actively refused",
    "econnrefused",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
];

/// Whether a transport error chain describes an unreachable server.
pub fn is_unreachable_message(detail: &str) -> bool {
    let lower = detail.to_ascii_lowercase();
    UNREACHABLE_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Flatten an error and its sources into one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!(" -> {}", cause));
        source = cause.source();
    }
    chain
}

/// Classify a failure to send or complete the request.
///
/// Only refused connections and failed name lookups are "unreachable";
/// other connector faults (TLS, certificates) keep their detail.
pub fn classify_transport(err: &reqwest::Error) -> GatewayError {
    let detail = error_chain(err);
    if is_unreachable_message(&detail) {
        GatewayError::Unreachable
    } else {
        GatewayError::Transport(detail)
    }
}
