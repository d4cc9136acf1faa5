//! AWS Cost Explorer and Bedrock usage tools.
//!
//! Every tool reaches AWS through [`AwsClients`], so the same tool runs
//! against the SDK ([`SdkAwsClients`]) or, with the `test-utils` feature,
//! against canned data.

pub mod aws;
pub mod bedrock;
pub mod cost;
pub(crate) mod params;
mod table;
#[cfg(feature = "test-utils")]
pub mod test_utils;

use spendlens_core::DynTool;
use std::sync::Arc;

pub use aws::{AwsClients, SdkAwsClients};
pub use bedrock::DEFAULT_LOG_GROUP;
pub use params::MAX_DAYS;

/// Every tool, in registration order. `default_log_group` is read by the
/// Bedrock usage tools when a request names no log group.
pub fn all_tools(clients: Arc<dyn AwsClients>, default_log_group: &str) -> Vec<Box<dyn DynTool>> {
    let mut tools = bedrock::all_tools(clients.clone(), default_log_group);
    tools.extend(cost::all_tools(clients));
    tools
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
    pub use spendlens_core::{Tool, ToolError, ToolResult};
}
