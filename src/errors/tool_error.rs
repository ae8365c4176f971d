use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    Validation,
    UpstreamHttp,
    Network,
    UpstreamContract,
    Configuration,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::Validation => "validation",
            ToolErrorKind::UpstreamHttp => "upstream_http",
            ToolErrorKind::Network => "network",
            ToolErrorKind::UpstreamContract => "upstream_contract",
            ToolErrorKind::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller-supplied argument violates a documented constraint. Raised before any I/O.
    #[error("invalid '{field}': {message}")]
    Validation {
        field: String,
        value: Value,
        message: String,
    },

    /// Non-2xx response, after the single unauthorized retry when it applies.
    #[error("upstream responded {status}: {message}")]
    UpstreamHttp {
        status: u16,
        body: Value,
        message: String,
    },

    /// No HTTP response at all.
    #[error("network error: {message}")]
    Network {
        message: String,
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },

    /// A successful response lacks something the tool depends on.
    #[error("upstream contract violation on '{field}': {message}")]
    UpstreamContract { field: String, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ToolError>,
    },
}

impl ToolError {
    pub fn validation(field: impl Into<String>, value: impl Into<Value>, message: impl Into<String>) -> Self {
        ToolError::Validation {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn contract(field: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::UpstreamContract {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds the HTTP error from a raw response body, preferring the API's own message.
    pub fn upstream(status: u16, raw_body: &str) -> Self {
        let body = serde_json::from_str::<Value>(raw_body)
            .unwrap_or_else(|_| Value::String(raw_body.to_owned()));
        let message = extract_message(&body).unwrap_or_else(|| match status {
            401 => "unauthorized".to_owned(),
            404 => "resource not found".to_owned(),
            _ => format!("request failed with status {}", status),
        });
        ToolError::UpstreamHttp { status, body, message }
    }

    pub fn network(source: reqwest::Error) -> Self {
        let timed_out = source.is_timeout();
        let message = if timed_out {
            format!("request timed out: {}", source)
        } else if source.is_connect() {
            format!("connection failed: {}", source)
        } else {
            source.to_string()
        };
        ToolError::Network { message, timed_out, source }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        ToolError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any context wrappers.
    pub fn root(&self) -> &ToolError {
        match self {
            ToolError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::Validation { .. } => ToolErrorKind::Validation,
            ToolError::UpstreamHttp { .. } => ToolErrorKind::UpstreamHttp,
            ToolError::Network { .. } => ToolErrorKind::Network,
            ToolError::UpstreamContract { .. } => ToolErrorKind::UpstreamContract,
            ToolError::Configuration(_) => ToolErrorKind::Configuration,
            ToolError::Context { source, .. } => source.kind(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.root() {
            ToolError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self.root() {
            ToolError::Validation { field, .. } | ToolError::UpstreamContract { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.root(), ToolError::Network { timed_out: true, .. })
    }

    /// Flat, serializable view shared by every adapter.
    pub fn payload(&self) -> ErrorPayload {
        let mut payload = ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
            field: None,
            value: None,
            status: None,
            body: None,
            not_found: false,
        };
        match self.root() {
            ToolError::Validation { field, value, .. } => {
                payload.field = Some(field.clone());
                payload.value = Some(value.clone());
            }
            ToolError::UpstreamHttp { status, body, .. } => {
                payload.status = Some(*status);
                payload.body = Some(body.clone());
                payload.not_found = *status == 404;
            }
            ToolError::UpstreamContract { field, .. } => {
                payload.field = Some(field.clone());
            }
            _ => {}
        }
        payload
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorPayload {
    pub kind: ToolErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
}

fn extract_message(body: &Value) -> Option<String> {
    let candidates = [
        body.pointer("/error/message"),
        body.get("message"),
        body.get("error_description"),
        body.get("error"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_owned))
}
