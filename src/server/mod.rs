pub mod server;
pub mod tool_routes;
