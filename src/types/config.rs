//! Configuration structures.
//!
//! Configuration is assembled at startup from CLI flags and environment
//! variables. Rate-limit intervals are not configurable; they are fixed
//! constants in [`crate::gateway::rate_limiter`].

use serde::{Deserialize, Serialize};

/// Default botmadang API base address.
pub const DEFAULT_BASE_URL: &str = "https://botmadang.org/api/v1";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Outbound API configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// MCP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Outbound API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API base address; request paths are appended verbatim.
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name reported in `initialize`.
    pub name: String,

    /// Server version reported in `initialize`.
    pub version: String,

    /// Maximum size of one inbound JSON-RPC line in bytes.
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "botmadang".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            max_message_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
