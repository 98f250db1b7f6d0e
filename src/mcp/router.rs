//! Top-level MCP router. Routes by JSON-RPC method.

use serde_json::{json, Value};

use crate::mcp::protocol::{negotiate_protocol_version, CallToolParams, RpcError};
use crate::tools::ToolRegistry;
use crate::types::ServerConfig;

/// Route one JSON-RPC request to its handler.
pub async fn route_request(
    registry: &ToolRegistry,
    config: &ServerConfig,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(initialize(config, &params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": registry.descriptors() })),
        "tools/call" => call_tool(registry, params).await,
        _ => Err(RpcError::method_not_found(method)),
    }
}

/// Handle a notification. Nothing is ever sent back.
pub fn route_notification(method: &str) {
    match method {
        "notifications/initialized" => tracing::info!("MCP client initialized"),
        "notifications/cancelled" => {
            tracing::debug!("Ignoring cancellation notice: in-flight calls run to completion")
        }
        _ => tracing::debug!("Ignoring notification {}", method),
    }
}

fn initialize(config: &ServerConfig, params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(Value::as_str);
    let version = negotiate_protocol_version(requested);
    if let Some(client) = params.get("clientInfo") {
        tracing::info!(protocol = version, client = %client, "MCP initialize");
    }

    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
        },
        "serverInfo": {
            "name": config.name,
            "version": config.version,
        },
    })
}

async fn call_tool(registry: &ToolRegistry, params: Value) -> Result<Value, RpcError> {
    let params: CallToolParams = serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;

    let result = registry.call(&params.name, params.arguments).await?;
    serde_json::to_value(result).map_err(|e| RpcError::internal(format!("serialization error: {}", e)))
}
