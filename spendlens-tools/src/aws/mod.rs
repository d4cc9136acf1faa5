//! AWS access for the cost and usage tools.
//!
//! Each service sits behind a small async trait ([`CostExplorerClient`],
//! [`LogsClient`]) so tools can be exercised without AWS. [`AwsClients`]
//! hands out clients for a given account and region, assuming a role in
//! the target account when needed.

pub mod cost_explorer;
pub mod error;
pub mod logs;
pub mod session;

pub use cost_explorer::{
    CostDimension, CostExplorerClient, CostGroup, CostPeriod, CostQuery, DimensionFilter,
    MetricAmount, SdkCostExplorerClient,
};
pub use error::AwsError;
pub use logs::{LogEvent, LogQuery, LogsClient, SdkLogsClient, MODEL_INVOCATION_STREAM};
pub use session::{role_arn, AwsClients, AwsTarget, SdkAwsClients};
