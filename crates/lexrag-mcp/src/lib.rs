//! LexRAG MCP Server
//!
//! Model Context Protocol server exposing the legal query operations as tools.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
