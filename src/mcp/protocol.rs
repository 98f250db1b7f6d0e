//! JSON-RPC 2.0 and MCP message types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tools::ToolEntry;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(PARSE_ERROR, format!("Parse error: {}", detail))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// One inbound message, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    Notification {
        method: String,
    },
    /// A response to a server-initiated request; this server never sends any.
    Response,
}

impl Incoming {
    /// Classify a decoded JSON value. `Err` carries the id to answer with.
    pub fn classify(value: Value) -> Result<Self, (Value, RpcError)> {
        let is_batch = value.is_array();
        let Value::Object(mut obj) = value else {
            let message = if is_batch {
                "Batch requests are not supported"
            } else {
                "Request must be a JSON object"
            };
            return Err((Value::Null, RpcError::invalid_request(message)));
        };

        let id = obj.remove("id");
        if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err((
                id.unwrap_or(Value::Null),
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let method = match obj.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => {
                return Err((
                    id.unwrap_or(Value::Null),
                    RpcError::invalid_request("method must be a string"),
                ))
            }
            None => return Ok(Incoming::Response),
        };
        let params = obj.remove("params").unwrap_or(Value::Null);

        Ok(match id {
            Some(id) => Incoming::Request { id, method, params },
            None => Incoming::Notification { method },
        })
    }
}

pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

pub fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": error,
    })
}

/// Pick the protocol revision to answer `initialize` with.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content block of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// `tools/call` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
}

impl CallToolResult {
    /// Single text block holding `value` pretty-printed with 2-space indent.
    pub fn json(value: &Value) -> serde_json::Result<Self> {
        Ok(Self {
            content: vec![ContentBlock::Text {
                text: serde_json::to_string_pretty(value)?,
            }],
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
    }
}

/// Behavior hints advertised with a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub read_only_hint: bool,
    pub open_world_hint: bool,
}

/// One `tools/list` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub annotations: ToolAnnotations,
}

impl ToolDescriptor {
    pub fn from_entry(entry: &ToolEntry) -> Self {
        Self {
            name: entry.id.clone(),
            description: entry.description.clone(),
            input_schema: entry.input_schema(),
            annotations: ToolAnnotations {
                read_only_hint: entry.is_read_only(),
                open_world_hint: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_request() {
        let incoming = Incoming::classify(json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/list"
        }))
        .unwrap();
        assert_eq!(
            incoming,
            Incoming::Request {
                id: json!(7),
                method: "tools/list".to_string(),
                params: Value::Null,
            }
        );
    }

    #[test]
    fn test_classify_notification_and_response() {
        assert_eq!(
            Incoming::classify(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
                .unwrap(),
            Incoming::Notification {
                method: "notifications/initialized".to_string()
            }
        );
        assert_eq!(
            Incoming::classify(json!({"jsonrpc": "2.0", "id": 1, "result": {}})).unwrap(),
            Incoming::Response
        );
    }

    #[test]
    fn test_classify_rejects_bad_envelopes() {
        let (id, err) = Incoming::classify(json!({"id": "x", "method": "ping"})).unwrap_err();
        assert_eq!(id, json!("x"));
        assert_eq!(err.code, INVALID_REQUEST);

        let (_, err) = Incoming::classify(json!([{"jsonrpc": "2.0"}])).unwrap_err();
        assert_eq!(err.message, "Batch requests are not supported");
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), LATEST_PROTOCOL_VERSION);
        assert_eq!(negotiate_protocol_version(None), LATEST_PROTOCOL_VERSION);
    }

    #[test]
    fn test_call_tool_result_is_pretty_text() {
        let result = CallToolResult::json(&json!({"success": true})).unwrap();
        assert_eq!(result.text(), Some("{\n  \"success\": true\n}"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"content": [{"type": "text", "text": "{\n  \"success\": true\n}"}]})
        );
    }

    #[test]
    fn test_error_response_omits_empty_data() {
        let response = error_response(json!(1), RpcError::method_not_found("foo"));
        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": "Method not found: foo"},
            })
        );
    }
}
