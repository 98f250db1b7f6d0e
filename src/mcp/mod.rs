//! MCP stdio transport layer.
//!
//! Newline-delimited JSON-RPC 2.0 over stdin/stdout, exposing the tool
//! registry as MCP tools.

pub mod codec;
pub mod protocol;
pub mod router;
pub mod server;

pub use server::McpServer;
