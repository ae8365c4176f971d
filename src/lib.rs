//! # Payments Agent Tools
//!
//! Exposes a payments REST API (payouts, payments, payment methods, refunds,
//! balance transactions, disputes) as agent-callable tools.
//!
//! Modules:
//! - `client`: OAuth2 client-credentials API client with a per-client token cache
//! - `cache`: bearer token cache with expiry skew and single-flight refresh
//! - `tools`: tool functions, argument validation and the tool registry
//! - `adapters`: MCP, chat and function-calling shapes of the registry
//! - `config`: YAML service configuration and its validation
//! - `server`: HTTP surface for the tools, health and metrics

pub mod adapters;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod tools;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::{ApiClient, ClientOptions, Credentials};
pub use crate::config::settings::ServiceConfig;
pub use crate::errors::{ErrorPayload, ToolError, ToolErrorKind};
pub use crate::tools::{ToolDescriptor, ToolRegistry, Toolkit};
