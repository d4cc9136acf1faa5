//! Bedrock usage tools built on the model invocation log in CloudWatch Logs.
//!
//! Records are read from the `aws/bedrock/modelinvocations` stream of the
//! configured log group, parsed into [`InvocationRecord`]s, and summarized
//! into daily or hourly text reports.

mod params;
mod record;
mod report;
mod stats;
mod usage;

pub use params::{BedrockLogsParams, BedrockToolInput};
pub use record::{parse_record, short_model_id, InvocationRecord};
pub use report::{daily_report, hourly_report, NO_USAGE_DATA};
pub use stats::{group_by, GroupStats, TokenStats};
pub use usage::{fetch_invocations, BedrockDailyUsageTool, BedrockHourlyUsageTool, InvocationLog};

use crate::aws::AwsClients;
use spendlens_core::{box_tool, DynTool};
use std::sync::Arc;

/// Log group read when neither the request nor the server configuration names one
pub const DEFAULT_LOG_GROUP: &str = "BedrockModelInvocationLogGroup";

/// Returns all Bedrock usage tools
pub fn all_tools(clients: Arc<dyn AwsClients>, default_log_group: &str) -> Vec<Box<dyn DynTool>> {
    vec![
        box_tool(BedrockDailyUsageTool::new(clients.clone(), default_log_group)),
        box_tool(BedrockHourlyUsageTool::new(clients, default_log_group)),
    ]
}
