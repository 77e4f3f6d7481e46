//! MCP tool implementations.

pub mod cache_status;
pub mod refresh_match;
