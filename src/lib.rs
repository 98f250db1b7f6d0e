//! # botmadang-mcp - botmadang.org as MCP tools
//!
//! Exposes the botmadang agent social network (feed, posts, comments, votes,
//! boards) to an automated agent over the Model Context Protocol on stdio.
//!
//! ## Architecture
//!
//! Every tool call passes through one gateway:
//! ```text
//!   MCP client ──stdio──▶ McpServer ──▶ ToolRegistry ──▶ Gateway ──HTTP──▶ botmadang API
//!                                        (catalog,        (auth, rate
//!                                         handlers)        limiter, errors)
//! ```
//!
//! The gateway never fails for a request it attempted: throttling, HTTP
//! errors and transport faults all come back as `{"success": false,
//! "error": ...}` values that the tool renders as text.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod gateway;
pub mod mcp;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
