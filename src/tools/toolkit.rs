use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::ApiClient;
use crate::config::settings::ServiceConfig;
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};

/// The tool surface every adapter consumes: one client, one registry, enable flags.
#[derive(Debug, Clone)]
pub struct Toolkit {
    client: Arc<ApiClient>,
    registry: Arc<ToolRegistry>,
    disabled: Arc<HashSet<String>>,
}

impl Toolkit {
    pub fn new(client: ApiClient) -> Self {
        Self::with_registry(client, ToolRegistry::standard())
    }

    pub fn with_registry(client: ApiClient, registry: ToolRegistry) -> Self {
        Self {
            client: Arc::new(client),
            registry: Arc::new(registry),
            disabled: Arc::new(HashSet::new()),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ToolError> {
        Self::new(ApiClient::from_config(config)?).with_tool_flags(&config.tools)
    }

    /// Applies `name -> enabled` flags. Unknown names are a configuration error.
    pub fn with_tool_flags(mut self, flags: &HashMap<String, bool>) -> Result<Self, ToolError> {
        let mut disabled = HashSet::new();
        for (name, enabled) in flags {
            if !self.registry.contains(name) {
                return Err(ToolError::Configuration(format!("unknown tool '{}' in tool flags", name)));
            }
            if !enabled {
                disabled.insert(name.to_owned());
            }
        }
        if !disabled.is_empty() {
            info!("disabled tools: {:?}", disabled);
        }
        self.disabled = Arc::new(disabled);
        Ok(self)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.registry.contains(name) && !self.disabled.contains(name)
    }

    /// Enabled tools, sorted by name.
    pub fn list_tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry
            .descriptors()
            .filter(|descriptor| !self.disabled.contains(&descriptor.name))
            .cloned()
            .collect()
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let entry = self
            .registry
            .get(name)
            .filter(|_| !self.disabled.contains(name))
            .ok_or_else(|| ToolError::validation("name", name, "unknown or disabled tool"))?;
        entry.call(self.client.clone(), arguments).await
    }
}
