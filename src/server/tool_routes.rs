use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::adapters::{function_calling, mcp};
use crate::errors::{ToolError, ToolErrorKind};
use crate::server::server::AppState;

pub fn router() -> Router<AppState> {
    info!("served paths: /healthz, /tools, /tools/{{name}}, /mcp");
    Router::new()
        .route("/healthz", get(healthz))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(invoke_tool))
        .route("/mcp", post(handle_mcp))
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tools": state.toolkit.list_tool_descriptors().len()
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Array(function_calling::definitions(&state.toolkit)))
}

/// Body is the raw arguments object; an empty body means no arguments.
async fn invoke_tool(State(state): State<AppState>, Path(name): Path<String>, body: Bytes) -> Response {
    let arguments = match parse_arguments(&body) {
        Ok(arguments) => arguments,
        Err(err) => return respond(Err(err)),
    };
    respond(state.toolkit.invoke(&name, arguments).await)
}

async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let message = match serde_json::from_slice::<Value>(&body) {
        Ok(message) => message,
        Err(e) => {
            let parse_error = json!({
                "jsonrpc": "2.0",
                "id": Value::Null,
                "error": { "code": -32700, "message": format!("Parse error: {}", e) }
            });
            return (StatusCode::OK, Json(parse_error)).into_response();
        }
    };
    match mcp::handle_rpc(&state.toolkit, message).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn parse_arguments(body: &[u8]) -> Result<Value, ToolError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| {
        ToolError::validation(
            "arguments",
            String::from_utf8_lossy(body).into_owned(),
            format!("not valid JSON: {}", e),
        )
    })
}

fn respond(result: Result<Value, ToolError>) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => status_for(err),
    };
    (status, Json(function_calling::envelope(result))).into_response()
}

fn status_for(err: &ToolError) -> StatusCode {
    match err.kind() {
        ToolErrorKind::Validation => StatusCode::BAD_REQUEST,
        ToolErrorKind::UpstreamHttp if err.is_not_found() => StatusCode::NOT_FOUND,
        ToolErrorKind::Network if err.timed_out() => StatusCode::GATEWAY_TIMEOUT,
        ToolErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}
