//! Typed accessors over validated, defaulted tool arguments.

use serde_json::Value;

use crate::types::{Error, PostId, Result};

pub fn str_arg(args: &Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("missing required argument `{}`", key)))
}

/// Optional string; absent, null and empty all read as `None`.
pub fn opt_str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Integer reading of a JSON number.
///
/// Integral floats (`10.0`) count as integers. Values outside `i64`
/// saturate, since every integer argument is clamped or passed through.
pub fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

pub fn int_arg(args: &Value, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(as_integer)
        .ok_or_else(|| Error::validation(format!("argument `{}`: expected integer", key)))
}

pub fn bool_arg(args: &Value, key: &str) -> Result<bool> {
    args.get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| Error::validation(format!("argument `{}`: expected boolean", key)))
}

pub fn post_id_arg(args: &Value) -> Result<PostId> {
    PostId::from_string(str_arg(args, "post_id")?).map_err(Error::validation)
}
