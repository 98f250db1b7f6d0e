//! Write tools: posting, commenting, voting, board creation.
//!
//! Only `post` and `comment` are throttled; votes and board creation go out
//! untagged.

use serde_json::{json, Map, Value};

use super::args::{opt_str_arg, post_id_arg, str_arg};
use super::catalog::{ParamDef, ParamType, ToolCategory, ToolEntry};
use crate::gateway::{outcome_value, Gateway, OperationClass};
use crate::types::{CommentId, Error, Result};

pub const DEFAULT_SUBMADANG: &str = "general";

fn entry(id: &str, description: &str, parameters: Vec<ParamDef>) -> ToolEntry {
    ToolEntry {
        id: id.to_string(),
        description: description.to_string(),
        parameters,
        category: ToolCategory::Write,
    }
}

pub fn post_entry() -> ToolEntry {
    entry(
        "post",
        "봇마당에 새 글을 작성합니다. 글 작성은 3분에 한 번으로 제한됩니다.",
        vec![
            ParamDef::required("title", ParamType::String, "글 제목 (한국어)"),
            ParamDef::required("content", ParamType::String, "글 내용 (한국어)"),
            ParamDef::with_default(
                "submadang",
                ParamType::String,
                "마당 (general, tech, daily, questions, showcase)",
                json!(DEFAULT_SUBMADANG),
            ),
        ],
    )
}

pub async fn post(gateway: &Gateway, args: &Value) -> Result<Value> {
    let body = json!({
        "title": str_arg(args, "title")?,
        "content": str_arg(args, "content")?,
        "submadang": str_arg(args, "submadang")?,
    });
    Ok(outcome_value(
        gateway.post("/posts", Some(&body), OperationClass::Post).await,
    ))
}

pub fn comment_entry() -> ToolEntry {
    entry(
        "comment",
        "특정 글에 댓글을 작성합니다. parent_id를 주면 대댓글이 됩니다. 댓글은 10초에 한 번으로 제한됩니다.",
        vec![
            ParamDef::required("post_id", ParamType::String, "글 ID"),
            ParamDef::required("content", ParamType::String, "댓글 내용 (한국어)"),
            ParamDef::optional("parent_id", ParamType::String, "대댓글인 경우: 부모 댓글 ID"),
        ],
    )
}

/// Comment payload; `parent_id` only when replying.
pub fn comment_body(content: String, parent: Option<&CommentId>) -> Value {
    let mut body = Map::new();
    body.insert("content".to_string(), Value::String(content));
    if let Some(parent) = parent {
        body.insert("parent_id".to_string(), Value::String(parent.to_string()));
    }
    Value::Object(body)
}

pub async fn comment(gateway: &Gateway, args: &Value) -> Result<Value> {
    let post_id = post_id_arg(args)?;
    let parent = opt_str_arg(args, "parent_id")
        .map(CommentId::from_string)
        .transpose()
        .map_err(Error::validation)?;
    let body = comment_body(str_arg(args, "content")?, parent.as_ref());

    Ok(outcome_value(
        gateway
            .post(
                &format!("/posts/{}/comments", post_id),
                Some(&body),
                OperationClass::Comment,
            )
            .await,
    ))
}

pub fn upvote_entry() -> ToolEntry {
    entry(
        "upvote",
        "글을 추천합니다.",
        vec![ParamDef::required("post_id", ParamType::String, "추천할 글 ID")],
    )
}

pub fn downvote_entry() -> ToolEntry {
    entry(
        "downvote",
        "글을 비추천합니다.",
        vec![ParamDef::required("post_id", ParamType::String, "비추천할 글 ID")],
    )
}

/// Vote on a post; `direction` is `upvote` or `downvote`.
pub async fn vote(gateway: &Gateway, args: &Value, direction: &str) -> Result<Value> {
    let post_id = post_id_arg(args)?;
    Ok(outcome_value(
        gateway
            .post(
                &format!("/posts/{}/{}", post_id, direction),
                None,
                OperationClass::None,
            )
            .await,
    ))
}

pub fn create_submadang_entry() -> ToolEntry {
    entry(
        "create_submadang",
        "새 마당(커뮤니티)을 만듭니다.",
        vec![
            ParamDef::required("name", ParamType::String, "마당 ID (영문 소문자)"),
            ParamDef::required("display_name", ParamType::String, "표시 이름 (한국어)"),
            ParamDef::required("description", ParamType::String, "마당 설명 (한국어)"),
        ],
    )
}

pub async fn create_submadang(gateway: &Gateway, args: &Value) -> Result<Value> {
    let body = json!({
        "name": str_arg(args, "name")?,
        "display_name": str_arg(args, "display_name")?,
        "description": str_arg(args, "description")?,
    });
    Ok(outcome_value(
        gateway
            .post("/submadangs", Some(&body), OperationClass::None)
            .await,
    ))
}
