//! Tool catalog: typed metadata, parameter validation and schema rendering.
//!
//! Owns tool *metadata*; the handlers live next to their entries in the
//! sibling modules. Arguments are validated and defaulted here before any
//! handler runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::args::as_integer;
use crate::types::{Error, Result};

/// Argument kinds the botmadang tools accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Bool,
    /// May be omitted or `null`.
    Optional(Box<ParamType>),
}

impl ParamType {
    fn schema_name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "integer",
            ParamType::Bool => "boolean",
            ParamType::Optional(inner) => inner.schema_name(),
        }
    }

    /// Check one argument value, returning the mismatch text on failure.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        let accepted = match self {
            ParamType::String => value.is_string(),
            ParamType::Int => as_integer(value).is_some(),
            ParamType::Bool => value.is_boolean(),
            ParamType::Optional(inner) => return if value.is_null() { Ok(()) } else { inner.validate(value) },
        };
        if accepted {
            Ok(())
        } else {
            Err(format!("expected {}, got {}", self.schema_name(), json_kind(value)))
        }
    }

    /// JSON Schema fragment describing this type.
    pub fn json_schema(&self) -> Value {
        json!({ "type": self.schema_name() })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One named argument of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    /// Filled in when the caller omits the argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn with_default(name: &str, param_type: ParamType, description: &str, default: Value) -> Self {
        Self {
            default: Some(default),
            ..Self::optional(name, param_type, description)
        }
    }

    /// Must the caller supply this argument?
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.param_type, ParamType::Optional(_))
    }

    fn json_schema(&self) -> Value {
        let mut schema = self.param_type.json_schema();
        schema["description"] = Value::String(self.description.clone());
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// What a tool does to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Read,
    Write,
}

/// Metadata for one tool: name, description, arguments, category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub id: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    pub category: ToolCategory,
}

impl ToolEntry {
    /// JSON Schema for the tool's argument object.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<Value> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| Value::String(p.name.clone()))
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }

    pub fn is_read_only(&self) -> bool {
        self.category == ToolCategory::Read
    }

    fn param(&self, name: &str) -> Option<&ParamDef> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Every problem with `args`, in parameter order then argument order.
    /// Names the tool does not declare are not checked here.
    fn check(&self, args: &Map<String, Value>) -> Vec<String> {
        let missing = self
            .parameters
            .iter()
            .filter(|p| p.is_required() && !args.contains_key(&p.name))
            .map(|p| format!("missing required argument `{}`", p.name));

        let invalid = args.iter().filter_map(|(key, value)| {
            let def = self.param(key)?;
            def.param_type
                .validate(value)
                .err()
                .map(|e| format!("argument `{}`: {}", key, e))
        });

        missing.chain(invalid).collect()
    }
}

/// Registered tools, keyed (and listed) by id. Owns metadata only.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; ids must be non-empty and unique.
    pub fn register(&mut self, entry: ToolEntry) -> Result<()> {
        if entry.id.trim().is_empty() {
            return Err(Error::validation("tool id must not be empty"));
        }
        if self.entries.contains_key(&entry.id) {
            return Err(Error::validation(format!("duplicate tool id `{}`", entry.id)));
        }
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn get(&self, tool_id: &str) -> Option<&ToolEntry> {
        self.entries.get(tool_id)
    }

    pub fn has_tool(&self, tool_id: &str) -> bool {
        self.entries.contains_key(tool_id)
    }

    /// All entries in id order.
    pub fn list_entries(&self) -> Vec<&ToolEntry> {
        self.entries.values().collect()
    }

    fn entry(&self, tool_id: &str) -> Result<&ToolEntry> {
        self.get(tool_id)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_id)))
    }

    /// Validate `params` for `tool_id`. An empty list means valid.
    pub fn validate_params(&self, tool_id: &str, params: &Value) -> Result<Vec<String>> {
        let entry = self.entry(tool_id)?;
        let args = params
            .as_object()
            .ok_or_else(|| Error::validation("tool arguments must be a JSON object"))?;
        Ok(entry.check(args))
    }

    /// Remove arguments `tool_id` does not declare, returning their names.
    pub fn strip_unknown(&self, tool_id: &str, params: &mut Value) -> Result<Vec<String>> {
        let entry = self.entry(tool_id)?;
        let Some(args) = params.as_object_mut() else {
            return Ok(Vec::new());
        };
        let unknown: Vec<String> = args
            .keys()
            .filter(|key| entry.param(key.as_str()).is_none())
            .cloned()
            .collect();
        for key in &unknown {
            args.remove(key);
        }
        Ok(unknown)
    }

    /// Insert defaults for arguments that are absent or `null`.
    pub fn fill_defaults(&self, tool_id: &str, params: &mut Value) -> Result<()> {
        let entry = self.entry(tool_id)?;
        let Some(args) = params.as_object_mut() else {
            return Ok(());
        };
        for def in &entry.parameters {
            let Some(default) = &def.default else {
                continue;
            };
            if args.get(&def.name).map_or(true, Value::is_null) {
                args.insert(def.name.clone(), default.clone());
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
