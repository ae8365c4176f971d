//! Chat-model framework convention: structured tools whose output is a string
//! for the model plus an optional machine-readable artifact.

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ToolError, ToolErrorKind};
use crate::tools::Toolkit;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatTool {
    pub name: String,
    pub description: String,
    pub args_schema: Value,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatToolStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatToolOutput {
    pub content: String,
    pub status: ChatToolStatus,
    pub artifact: Option<Value>,
}

pub fn tools(toolkit: &Toolkit) -> Vec<ChatTool> {
    toolkit
        .list_tool_descriptors()
        .into_iter()
        .map(|d| ChatTool {
            name: d.name,
            description: d.description,
            args_schema: d.parameter_schema,
        })
        .collect()
}

pub async fn invoke(toolkit: &Toolkit, name: &str, arguments: Value) -> ChatToolOutput {
    match toolkit.invoke(name, arguments).await {
        Ok(data) => ChatToolOutput {
            content: data.to_string(),
            status: ChatToolStatus::Success,
            artifact: Some(data),
        },
        Err(err) => ChatToolOutput {
            content: error_text(&err),
            status: ChatToolStatus::Error,
            artifact: serde_json::to_value(err.payload()).ok(),
        },
    }
}

fn error_text(err: &ToolError) -> String {
    let payload = err.payload();
    match (&payload.field, payload.status) {
        (Some(field), _) if err.kind() == ToolErrorKind::Validation => {
            format!("Invalid argument '{}': {}", field, payload.message)
        }
        (_, Some(404)) => format!("Not found: {}", payload.message),
        (_, Some(status)) => format!("Payments API error {}: {}", status, payload.message),
        _ => format!("Error: {}", payload.message),
    }
}
