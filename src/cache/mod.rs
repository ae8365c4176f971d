pub mod token;
pub mod token_cache;

pub use token::{FetchedToken, Token};
pub use token_cache::TokenCache;
