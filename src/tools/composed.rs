//! Tools that combine several gateway calls client-side.

use serde_json::{json, Value};

use super::args::int_arg;
use super::catalog::{ParamDef, ParamType, ToolCategory, ToolEntry};
use crate::gateway::{outcome_value, Gateway};
use crate::types::{AgentId, Result};

pub const MY_POSTS_LIMIT_DEFAULT: i64 = 20;

const IDENTITY_UNAVAILABLE: &str = "에이전트 정보를 가져올 수 없습니다.";
const FEED_UNAVAILABLE: &str = "피드를 가져올 수 없습니다.";

pub fn my_posts_entry() -> ToolEntry {
    ToolEntry {
        id: "my_posts".to_string(),
        description: "최근 피드에서 내가 작성한 글만 골라 보여줍니다.".to_string(),
        parameters: vec![ParamDef::with_default(
            "limit",
            ParamType::Int,
            "검색할 피드 범위 (기본값: 20)",
            json!(MY_POSTS_LIMIT_DEFAULT),
        )],
        category: ToolCategory::Read,
    }
}

// Typed views over the opaque API bodies. Only the fields composition needs.

fn succeeded(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// String form of an id field; numeric ids are accepted too.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `agent.id` of a successful `/agents/me` body.
pub fn identity(me: &Value) -> Option<AgentId> {
    if !succeeded(me) {
        return None;
    }
    let id = me.get("agent")?.get("id").and_then(id_text)?;
    AgentId::from_string(id).ok()
}

/// `posts` of a successful feed body.
pub fn feed_posts(feed: &Value) -> Option<&Vec<Value>> {
    if !succeeded(feed) {
        return None;
    }
    feed.get("posts")?.as_array()
}

/// Posts authored by `agent`, in feed order.
pub fn authored_by(posts: &[Value], agent: &AgentId) -> Vec<Value> {
    posts
        .iter()
        .filter(|post| {
            post.get("author_id").and_then(id_text).as_deref() == Some(agent.as_str())
        })
        .cloned()
        .collect()
}

fn unavailable(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

/// Identity fetch, then feed fetch, then filter by author.
///
/// The feed is never requested when the identity cannot be resolved.
pub async fn my_posts(gateway: &Gateway, args: &Value) -> Result<Value> {
    let limit = int_arg(args, "limit")?;

    let me = outcome_value(gateway.get("/agents/me").await);
    let Some(agent) = identity(&me) else {
        tracing::debug!("my_posts: identity unavailable");
        return Ok(unavailable(IDENTITY_UNAVAILABLE));
    };

    let feed = outcome_value(gateway.get(&format!("/posts?limit={}", limit)).await);
    let Some(posts) = feed_posts(&feed) else {
        tracing::debug!(agent = %agent, "my_posts: feed unavailable");
        return Ok(unavailable(FEED_UNAVAILABLE));
    };

    let mine = authored_by(posts, &agent);
    tracing::debug!(agent = %agent, scanned = posts.len(), matched = mine.len(), "my_posts filtered");
    Ok(json!({
        "success": true,
        "count": mine.len(),
        "posts": mine,
    }))
}
