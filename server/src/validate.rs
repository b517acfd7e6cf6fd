//! Request body and path parameter checks.
//!
//! # Design
//! Bodies are parsed into `serde_json::Value` first and then checked field
//! by field, rather than deserialized straight into a struct. That keeps
//! "not JSON" (`MalformedJson`) apart from "JSON of the wrong shape"
//! (`InvalidBody`) and lets each failure carry its own message.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::{NewTodo, TodoId, TodoPatch};

pub const BODY_NOT_OBJECT: &str = "Request body must be a JSON object.";
pub const TITLE_REQUIRED: &str = "Title is required.";
pub const TITLE_INVALID: &str = "Title must be a non-empty string.";
pub const COMPLETED_INVALID: &str = "Completed must be a boolean.";
pub const PATCH_EMPTY: &str = "Provide a title or completed value to update.";

/// Parse a raw request body. An empty body is `{}`; anything else must be
/// valid JSON, so a whitespace-only body is malformed.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::MalformedJson)
}

/// Check a `POST /todos` body: `title` must be a string that is non-empty
/// once trimmed. The returned title is trimmed.
pub fn validate_create(value: &Value) -> Result<NewTodo, ApiError> {
    let body = as_object(value)?;
    let raw = body
        .get("title")
        .ok_or(ApiError::InvalidBody(TITLE_REQUIRED))?;
    Ok(NewTodo {
        title: validate_title(raw)?,
    })
}

/// Check a `PATCH /todos/{id}` body. Both fields are optional but at least
/// one must be present, and any present field must have the right type.
/// Unknown fields are ignored.
pub fn validate_patch(value: &Value) -> Result<TodoPatch, ApiError> {
    let body = as_object(value)?;
    let title = body.get("title").map(validate_title).transpose()?;
    let completed = body
        .get("completed")
        .map(|raw| raw.as_bool().ok_or(ApiError::InvalidBody(COMPLETED_INVALID)))
        .transpose()?;

    let patch = TodoPatch { title, completed };
    if patch.is_empty() {
        return Err(ApiError::InvalidBody(PATCH_EMPTY));
    }
    Ok(patch)
}

/// Parse the `{id}` segment of `/todos/{id}`: ASCII digits only, non-zero,
/// and within range.
pub fn parse_todo_id(segment: &str) -> Result<TodoId, ApiError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidId);
    }
    match segment.parse::<TodoId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId),
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ApiError> {
    value.as_object().ok_or(ApiError::InvalidBody(BODY_NOT_OBJECT))
}

fn validate_title(raw: &Value) -> Result<String, ApiError> {
    raw.as_str()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::InvalidBody(TITLE_INVALID))
}
