pub mod tool_error;

pub use tool_error::{ErrorPayload, ToolError, ToolErrorKind};
