use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, info_span, warn, Instrument};

use crate::client::ApiClient;
use crate::errors::ToolError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::tools::{balance_transactions, disputes, payment_methods, payments, payouts, refunds};

static OK_MSG: &'static str = "ok";

static MISSING_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"missing field `([A-Za-z0-9_]+)`").ok());

/// Name, description and JSON-Schema parameters of one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, parameter_schema: Value) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            parameter_schema,
        }
    }
}

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;
pub type ToolHandler = Arc<dyn Fn(Arc<ApiClient>, Value) -> ToolFuture + Send + Sync>;

#[derive(Clone)]
pub struct ToolEntry {
    pub descriptor: ToolDescriptor,
    handler: ToolHandler,
}

impl ToolEntry {
    pub fn call(&self, client: Arc<ApiClient>, arguments: Value) -> ToolFuture {
        (self.handler)(client, arguments)
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry").field("descriptor", &self.descriptor).finish()
    }
}

/// Tool name -> (descriptor, handler). Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payments operation.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        payouts::register(&mut registry);
        payments::register(&mut registry);
        payment_methods::register(&mut registry);
        refunds::register(&mut registry);
        balance_transactions::register(&mut registry);
        disputes::register(&mut registry);
        registry
    }

    /// Registers `function` under the descriptor's name, wrapped with argument
    /// decoding, a tracing span and metrics.
    pub fn register<P, F, Fut>(&mut self, descriptor: ToolDescriptor, function: F)
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(Arc<ApiClient>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler = traced(descriptor.name.to_owned(), declared_properties(&descriptor), function);
        self.entries
            .insert(descriptor.name.to_owned(), ToolEntry { descriptor, handler });
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.values().map(|entry| &entry.descriptor)
    }
}

fn traced<P, F, Fut>(name: String, allowed: BTreeSet<String>, function: F) -> ToolHandler
where
    P: DeserializeOwned + Send + 'static,
    F: Fn(Arc<ApiClient>, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    Arc::new(move |client: Arc<ApiClient>, arguments: Value| {
        let name = name.to_owned();
        let span = info_span!("tool", name = %name);
        let call = reject_unknown_arguments(&arguments, &allowed)
            .and_then(|_| decode_arguments::<P>(arguments))
            .map(|params| function(client, params));
        Box::pin(
            async move {
                let metrics = get_metrics().await;
                let start = get_instant();
                let result = match call {
                    Ok(call) => call.await,
                    Err(err) => Err(err),
                };
                let outcome = match &result {
                    Ok(_) => {
                        info!("completed in {:?}", start.elapsed());
                        OK_MSG
                    }
                    Err(err) => {
                        warn!(kind = err.kind().as_str(), "failed in {:?}: {}", start.elapsed(), err);
                        err.kind().as_str()
                    }
                };
                metrics.tool_invocations.with_label_values(&[name.as_str(), outcome]).inc();
                metrics
                    .tool_duration
                    .with_label_values(&[name.as_str()])
                    .observe(start.elapsed().as_secs_f64());
                result
            }
            .instrument(span),
        ) as ToolFuture
    })
}

/// Property names the descriptor's parameter schema declares.
fn declared_properties(descriptor: &ToolDescriptor) -> BTreeSet<String> {
    descriptor
        .parameter_schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default()
}

/// Schemas are closed (`additionalProperties: false`); any other key is rejected.
/// Non-object arguments are left to decoding.
pub fn reject_unknown_arguments(arguments: &Value, allowed: &BTreeSet<String>) -> Result<(), ToolError> {
    let Some(object) = arguments.as_object() else {
        return Ok(());
    };
    match object.keys().find(|key| !allowed.contains(*key)) {
        Some(key) => Err(ToolError::validation(
            key.to_owned(),
            object[key].clone(),
            format!("unknown argument; expected one of {:?}", allowed),
        )),
        None => Ok(()),
    }
}

/// `null` means "no arguments". Decoding failures are validation errors.
pub fn decode_arguments<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value::<P>(arguments.clone()).map_err(|e| {
        let message = e.to_string();
        let field = MISSING_FIELD
            .as_ref()
            .and_then(|re| re.captures(&message))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
            .unwrap_or_else(|| "arguments".to_owned());
        ToolError::validation(field, arguments, message)
    })
}
