//! Core types for the botmadang MCP server.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (PostId, CommentId, AgentId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for gateway, server, and logging

mod config;
mod errors;
mod ids;

pub use config::{Config, GatewayConfig, ObservabilityConfig, ServerConfig, DEFAULT_BASE_URL};
pub use errors::{Error, Result};
pub use ids::{AgentId, CommentId, PostId};
