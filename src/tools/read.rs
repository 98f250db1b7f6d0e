//! Read-only tools: feed, comments, boards, identity, notifications.

use serde_json::{json, Value};

use super::args::{bool_arg, int_arg, opt_str_arg, post_id_arg};
use super::catalog::{ParamDef, ParamType, ToolCategory, ToolEntry};
use crate::gateway::{outcome_value, Gateway};
use crate::types::Result;

/// Bounds the API accepts for `/posts?limit=`.
pub const FEED_LIMIT_MIN: i64 = 1;
pub const FEED_LIMIT_MAX: i64 = 30;
pub const FEED_LIMIT_DEFAULT: i64 = 10;

fn entry(id: &str, description: &str, parameters: Vec<ParamDef>) -> ToolEntry {
    ToolEntry {
        id: id.to_string(),
        description: description.to_string(),
        parameters,
        category: ToolCategory::Read,
    }
}

pub fn feed_entry() -> ToolEntry {
    entry(
        "feed",
        "봇마당 피드에서 최신 글 목록을 가져옵니다.",
        vec![
            ParamDef::with_default(
                "limit",
                ParamType::Int,
                "가져올 글 수 (1-30, 기본값 10)",
                json!(FEED_LIMIT_DEFAULT),
            ),
            ParamDef::optional(
                "submadang",
                ParamType::String,
                "마당 필터 (general, tech, daily, questions, showcase)",
            ),
        ],
    )
}

/// `/posts?limit=N[&submadang=S]` with N clamped to the accepted range.
pub fn feed_path(limit: i64, submadang: Option<&str>) -> String {
    let limit = limit.clamp(FEED_LIMIT_MIN, FEED_LIMIT_MAX);
    match submadang {
        Some(board) => format!("/posts?limit={}&submadang={}", limit, board),
        None => format!("/posts?limit={}", limit),
    }
}

pub async fn feed(gateway: &Gateway, args: &Value) -> Result<Value> {
    let path = feed_path(int_arg(args, "limit")?, opt_str_arg(args, "submadang").as_deref());
    Ok(outcome_value(gateway.get(&path).await))
}

pub fn comments_entry() -> ToolEntry {
    entry(
        "comments",
        "특정 글의 댓글을 대댓글까지 포함해 조회합니다.",
        vec![ParamDef::required("post_id", ParamType::String, "글 ID")],
    )
}

pub async fn comments(gateway: &Gateway, args: &Value) -> Result<Value> {
    let post_id = post_id_arg(args)?;
    Ok(outcome_value(
        gateway.get(&format!("/posts/{}/comments", post_id)).await,
    ))
}

pub fn submadangs_entry() -> ToolEntry {
    entry("submadangs", "사용 가능한 마당(커뮤니티) 목록을 조회합니다.", vec![])
}

pub async fn submadangs(gateway: &Gateway) -> Result<Value> {
    Ok(outcome_value(gateway.get("/submadangs").await))
}

pub fn me_entry() -> ToolEntry {
    entry("me", "내 에이전트 정보를 조회합니다.", vec![])
}

pub async fn me(gateway: &Gateway) -> Result<Value> {
    Ok(outcome_value(gateway.get("/agents/me").await))
}

pub fn notifications_entry() -> ToolEntry {
    entry(
        "notifications",
        "알림을 조회합니다. 기본값은 읽지 않은 알림만입니다.",
        vec![ParamDef::with_default(
            "unread_only",
            ParamType::Bool,
            "읽지 않은 알림만 (기본값: true)",
            json!(true),
        )],
    )
}

pub fn notifications_path(unread_only: bool) -> &'static str {
    if unread_only {
        "/notifications?unread_only=true"
    } else {
        "/notifications"
    }
}

pub async fn notifications(gateway: &Gateway, args: &Value) -> Result<Value> {
    let path = notifications_path(bool_arg(args, "unread_only")?);
    Ok(outcome_value(gateway.get(path).await))
}

pub fn agent_status_entry() -> ToolEntry {
    entry("agent_status", "에이전트의 인증(claim) 상태를 확인합니다.", vec![])
}

pub async fn agent_status(gateway: &Gateway) -> Result<Value> {
    Ok(outcome_value(gateway.get("/agents/status").await))
}
