//! Adapters from the tool registry to agent calling conventions.
//! They differ only in how descriptors, results and errors are shaped.

pub mod chat;
pub mod function_calling;
pub mod mcp;
