use std::env;

use crate::config::settings::CredentialsConfig;
use crate::errors::ToolError;
use crate::utils::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET};

/// OAuth client-credentials pair. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self, ToolError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.trim().is_empty() {
            return Err(ToolError::Configuration("client_id must not be empty".to_owned()));
        }
        if client_secret.trim().is_empty() {
            return Err(ToolError::Configuration("client_secret must not be empty".to_owned()));
        }
        Ok(Self { client_id, client_secret })
    }

    /// Values from the config file win; blank or missing ones fall back to the environment.
    pub fn resolve(config: &CredentialsConfig) -> Result<Self, ToolError> {
        let pick = |configured: &Option<String>, var: &str| {
            configured
                .as_ref()
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| env::var(var).unwrap_or_default())
        };
        Self::new(
            pick(&config.client_id, ENV_CLIENT_ID),
            pick(&config.client_secret, ENV_CLIENT_SECRET),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
