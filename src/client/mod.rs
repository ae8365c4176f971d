//! Authenticated access to the payments API.

pub mod api_client;
pub mod credentials;
pub mod oauth2;
pub mod request;

pub use api_client::{ApiClient, ClientOptions};
pub use credentials::Credentials;
pub use request::ApiRequest;
