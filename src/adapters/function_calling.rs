//! Plain function-calling schema: `{"type":"function","function":{...}}` definitions
//! and a flat `ok` / `error` result envelope.

use serde_json::{json, Value};

use crate::errors::ToolError;
use crate::tools::Toolkit;

pub fn definitions(toolkit: &Toolkit) -> Vec<Value> {
    toolkit
        .list_tool_descriptors()
        .into_iter()
        .map(|d| {
            json!({
                "type": "function",
                "function": {
                    "name": d.name,
                    "description": d.description,
                    "parameters": d.parameter_schema
                }
            })
        })
        .collect()
}

/// `arguments` is the raw JSON string a model produces; blank means no arguments.
pub async fn call(toolkit: &Toolkit, name: &str, arguments: &str) -> Value {
    let parsed = if arguments.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(arguments)
            .map_err(|e| ToolError::validation("arguments", arguments, format!("not valid JSON: {}", e)))
    };
    match parsed {
        Ok(arguments) => call_value(toolkit, name, arguments).await,
        Err(err) => envelope(Err(err)),
    }
}

pub async fn call_value(toolkit: &Toolkit, name: &str, arguments: Value) -> Value {
    envelope(toolkit.invoke(name, arguments).await)
}

pub fn envelope(result: Result<Value, ToolError>) -> Value {
    match result {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(err) => json!({ "ok": false, "error": err.payload() }),
    }
}
