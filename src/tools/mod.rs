//! Tool layer: catalog, argument handling and the botmadang handlers.
//!
//! Handlers are thin adapters: a fixed path, verb and payload shape mapped
//! onto one [`crate::gateway::Gateway`] call (two for `my_posts`). None of
//! them builds its own HTTP request.

pub mod args;
pub mod catalog;
pub mod composed;
pub mod read;
pub mod registry;
pub mod write;

pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolCategory, ToolEntry};
pub use registry::{BotmadangTool, ToolRegistry};
