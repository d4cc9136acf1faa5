//! # spendlens-core
//!
//! Building blocks shared by the spendlens server and client:
//!
//! - [`Tool`] and [`DynTool`]: typed tools with JSON schemas generated from
//!   their input types, and their object-safe form for registries
//! - [`ToolResult`] and [`ToolError`]: what a tool returns
//! - [`mcp`] (feature `mcp`): a client for talking to MCP servers
//!
//! ## Feature Flags
//!
//! - `mcp` - Model Context Protocol client

pub mod tool;

#[cfg(feature = "mcp")]
pub mod mcp;

pub use tool::{box_tool, DynTool, Tool, ToolError, ToolResult};
