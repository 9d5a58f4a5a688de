//! CLI command handlers

pub mod backends;
pub mod config;
pub mod query;
pub mod status;
