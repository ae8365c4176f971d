//! Generic agent protocol (MCP-style `tools/list` and `tools/call` over JSON-RPC 2.0).

use serde_json::{json, Value};
use tracing::debug;

use crate::tools::Toolkit;

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "payments-agent-tools";

#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self { code: -32600, message: message.into() }
    }

    fn method_not_found(method: &str) -> Self {
        Self { code: -32601, message: format!("Method not found: {}", method) }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: -32602, message: message.into() }
    }
}

pub fn list_tools(toolkit: &Toolkit) -> Value {
    let tools: Vec<Value> = toolkit
        .list_tool_descriptors()
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.parameter_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// Tool failures are results with `isError`, not JSON-RPC errors.
pub async fn call_tool(toolkit: &Toolkit, name: &str, arguments: Value) -> Value {
    match toolkit.invoke(name, arguments).await {
        Ok(data) => {
            let text = text_of(&data);
            // structuredContent must be a JSON object
            let structured = if data.is_object() { data } else { json!({ "result": data }) };
            json!({
                "content": [{ "type": "text", "text": text }],
                "structuredContent": structured,
                "isError": false
            })
        }
        Err(err) => {
            let payload = err.payload();
            json!({
                "content": [{ "type": "text", "text": payload.message }],
                "structuredContent": { "error": payload },
                "isError": true
            })
        }
    }
}

/// Handles one JSON-RPC message. Notifications (no `id`) yield `None`.
pub async fn handle_rpc(toolkit: &Toolkit, message: Value) -> Option<Value> {
    let Some(obj) = message.as_object() else {
        return Some(error_response(Value::Null, RpcError::invalid_request("Request must be a JSON object")));
    };
    let id = obj.get("id").cloned();
    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Some(error_response(
            id.unwrap_or(Value::Null),
            RpcError::invalid_request("jsonrpc must be '2.0'"),
        ));
    }
    let Some(method) = obj.get("method").and_then(Value::as_str) else {
        return Some(error_response(
            id.unwrap_or(Value::Null),
            RpcError::invalid_request("missing method"),
        ));
    };
    let Some(id) = id else {
        debug!("ignoring notification '{}'", method);
        return None;
    };

    let params = obj.get("params").cloned().unwrap_or(Value::Null);
    let result = match method {
        "initialize" => Ok(initialize_payload()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(list_tools(toolkit)),
        "tools/call" => handle_tools_call(toolkit, params).await,
        other => Err(RpcError::method_not_found(other)),
    };
    Some(match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(err) => error_response(id, err),
    })
}

async fn handle_tools_call(toolkit: &Toolkit, params: Value) -> Result<Value, RpcError> {
    let params = params
        .as_object()
        .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
    Ok(call_tool(toolkit, name, arguments).await)
}

fn initialize_payload() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
    })
}

fn error_response(id: Value, err: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": err.code, "message": err.message }
    })
}

fn text_of(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
