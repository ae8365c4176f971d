//! Argument checks shared by every tool. All of them run before any network call.

use std::ops::RangeInclusive;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::ApiRequest;
use crate::errors::ToolError;

pub const LIST_LIMIT: RangeInclusive<i64> = 1..=100;
pub const RECENT_PAYOUTS_LIMIT: RangeInclusive<i64> = 1..=25;
pub const RECENT_PAYMENTS_LIMIT: RangeInclusive<i64> = 1..=50;
pub const RECENT_DEFAULT_LIMIT: i64 = 10;

pub fn validate_limit(limit: Option<i64>, range: RangeInclusive<i64>) -> Result<Option<i64>, ToolError> {
    match limit {
        Some(value) if !range.contains(&value) => Err(ToolError::validation(
            "limit",
            value,
            format!("must be between {} and {}", range.start(), range.end()),
        )),
        other => Ok(other),
    }
}

/// Blank cursors count as absent.
pub fn validate_cursors<'a>(
    after_cursor: Option<&'a str>,
    before_cursor: Option<&'a str>,
) -> Result<(Option<&'a str>, Option<&'a str>), ToolError> {
    let after = after_cursor.filter(|c| !c.trim().is_empty());
    let before = before_cursor.filter(|c| !c.trim().is_empty());
    if let (Some(after), Some(before)) = (after, before) {
        return Err(ToolError::validation(
            "before_cursor",
            json!({ "after_cursor": after, "before_cursor": before }),
            "after_cursor and before_cursor are mutually exclusive",
        ));
    }
    Ok((after, before))
}

pub fn validate_identifier<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::validation(field, value, "must not be empty"));
    }
    // URL normalization drops dot segments, which would retarget the request
    if matches!(value.trim(), "." | "..") {
        return Err(ToolError::validation(field, value, "must not be a '.' or '..' path segment"));
    }
    Ok(value)
}

pub fn validate_optional_identifier<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, ToolError> {
    value.map(|v| validate_identifier(field, v)).transpose()
}

/// Amounts are integers in minor currency units.
pub fn validate_amount(field: &str, amount: i64) -> Result<i64, ToolError> {
    if amount <= 0 {
        return Err(ToolError::validation(field, amount, "must be a positive integer in minor units"));
    }
    Ok(amount)
}

pub fn validate_currency(currency: &str) -> Result<String, ToolError> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ToolError::validation("currency", currency, "must be a three-letter ISO 4217 code"));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Cursor pagination arguments shared by list tools.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub after_cursor: Option<String>,
    pub before_cursor: Option<String>,
}

impl Pagination {
    /// Validates and appends `limit` / cursor query parameters.
    pub fn apply(&self, request: ApiRequest, range: RangeInclusive<i64>) -> Result<ApiRequest, ToolError> {
        let limit = validate_limit(self.limit, range)?;
        let (after, before) = validate_cursors(self.after_cursor.as_deref(), self.before_cursor.as_deref())?;
        Ok(request
            .query_opt("limit", limit)
            .query_opt("after_cursor", after)
            .query_opt("before_cursor", before))
    }

    /// JSON-Schema properties for `limit`, `after_cursor` and `before_cursor`.
    pub fn schema_properties(range: RangeInclusive<i64>) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert(
            "limit".to_owned(),
            json!({
                "type": "integer",
                "minimum": range.start(),
                "maximum": range.end(),
                "description": format!("Number of records to return ({}-{})", range.start(), range.end())
            }),
        );
        properties.insert(
            "after_cursor".to_owned(),
            json!({
                "type": "string",
                "description": "Return records after this cursor. Cannot be combined with before_cursor."
            }),
        );
        properties.insert(
            "before_cursor".to_owned(),
            json!({
                "type": "string",
                "description": "Return records before this cursor. Cannot be combined with after_cursor."
            }),
        );
        properties
    }
}

/// Object schema from properties plus the required names.
pub fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

pub fn identifier_property(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

pub fn idempotency_key_property() -> Value {
    json!({
        "type": "string",
        "description": "Client-supplied key so a retried write is applied at most once"
    })
}

/// Reads `status` from a record, also looking inside a `data` envelope.
pub fn project_status(record: &Value) -> Result<String, ToolError> {
    record
        .get("status")
        .or_else(|| record.pointer("/data/status"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ToolError::contract("status", "successful response has no string 'status' field"))
}
