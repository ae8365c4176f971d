mod common;

mod adapters;
mod registry_end_to_end;
mod token_cache_expiry;
