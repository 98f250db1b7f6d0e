//! Tool registry. Maps tool names to handlers over one shared gateway.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::catalog::{ToolCatalog, ToolEntry};
use super::{composed, read, write};
use crate::gateway::Gateway;
use crate::mcp::protocol::{CallToolResult, ToolDescriptor};
use crate::types::{Error, Result};

/// Every tool the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotmadangTool {
    Feed,
    Comments,
    Submadangs,
    Me,
    Notifications,
    AgentStatus,
    MyPosts,
    Post,
    Comment,
    Upvote,
    Downvote,
    CreateSubmadang,
}

impl BotmadangTool {
    pub const ALL: [BotmadangTool; 12] = [
        BotmadangTool::Feed,
        BotmadangTool::Comments,
        BotmadangTool::Submadangs,
        BotmadangTool::Me,
        BotmadangTool::Notifications,
        BotmadangTool::AgentStatus,
        BotmadangTool::MyPosts,
        BotmadangTool::Post,
        BotmadangTool::Comment,
        BotmadangTool::Upvote,
        BotmadangTool::Downvote,
        BotmadangTool::CreateSubmadang,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BotmadangTool::Feed => "feed",
            BotmadangTool::Comments => "comments",
            BotmadangTool::Submadangs => "submadangs",
            BotmadangTool::Me => "me",
            BotmadangTool::Notifications => "notifications",
            BotmadangTool::AgentStatus => "agent_status",
            BotmadangTool::MyPosts => "my_posts",
            BotmadangTool::Post => "post",
            BotmadangTool::Comment => "comment",
            BotmadangTool::Upvote => "upvote",
            BotmadangTool::Downvote => "downvote",
            BotmadangTool::CreateSubmadang => "create_submadang",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn entry(self) -> ToolEntry {
        match self {
            BotmadangTool::Feed => read::feed_entry(),
            BotmadangTool::Comments => read::comments_entry(),
            BotmadangTool::Submadangs => read::submadangs_entry(),
            BotmadangTool::Me => read::me_entry(),
            BotmadangTool::Notifications => read::notifications_entry(),
            BotmadangTool::AgentStatus => read::agent_status_entry(),
            BotmadangTool::MyPosts => composed::my_posts_entry(),
            BotmadangTool::Post => write::post_entry(),
            BotmadangTool::Comment => write::comment_entry(),
            BotmadangTool::Upvote => write::upvote_entry(),
            BotmadangTool::Downvote => write::downvote_entry(),
            BotmadangTool::CreateSubmadang => write::create_submadang_entry(),
        }
    }

    /// Run the handler against already validated and defaulted arguments.
    pub async fn invoke(self, gateway: &Gateway, args: &Value) -> Result<Value> {
        match self {
            BotmadangTool::Feed => read::feed(gateway, args).await,
            BotmadangTool::Comments => read::comments(gateway, args).await,
            BotmadangTool::Submadangs => read::submadangs(gateway).await,
            BotmadangTool::Me => read::me(gateway).await,
            BotmadangTool::Notifications => read::notifications(gateway, args).await,
            BotmadangTool::AgentStatus => read::agent_status(gateway).await,
            BotmadangTool::MyPosts => composed::my_posts(gateway, args).await,
            BotmadangTool::Post => write::post(gateway, args).await,
            BotmadangTool::Comment => write::comment(gateway, args).await,
            BotmadangTool::Upvote => write::vote(gateway, args, "upvote").await,
            BotmadangTool::Downvote => write::vote(gateway, args, "downvote").await,
            BotmadangTool::CreateSubmadang => write::create_submadang(gateway, args).await,
        }
    }
}

/// Catalog plus the gateway every handler calls through.
#[derive(Debug)]
pub struct ToolRegistry {
    catalog: ToolCatalog,
    gateway: Arc<Gateway>,
}

impl ToolRegistry {
    pub fn new(gateway: Arc<Gateway>) -> Result<Self> {
        let mut catalog = ToolCatalog::new();
        for tool in BotmadangTool::ALL {
            catalog.register(tool.entry())?;
        }
        tracing::debug!(tools = catalog.len(), "Tool catalog ready");
        Ok(Self { catalog, gateway })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Descriptors for `tools/list`.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.catalog
            .list_entries()
            .into_iter()
            .map(ToolDescriptor::from_entry)
            .collect()
    }

    /// Validate, default, dispatch, and wrap the outcome as a text block.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        let tool = BotmadangTool::from_name(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", name)))?;

        let mut args = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args,
        };
        let errors = self.catalog.validate_params(name, &args)?;
        if !errors.is_empty() {
            return Err(Error::validation(format!(
                "Invalid arguments for tool {}: {}",
                name,
                errors.join("; ")
            )));
        }
        let ignored = self.catalog.strip_unknown(name, &mut args)?;
        if !ignored.is_empty() {
            tracing::warn!(tool = name, ?ignored, "Ignoring undeclared arguments");
        }
        self.catalog.fill_defaults(name, &mut args)?;

        tracing::debug!(tool = name, "Invoking tool");
        let outcome = tool.invoke(&self.gateway, &args).await?;
        Ok(CallToolResult::json(&outcome)?)
    }
}
