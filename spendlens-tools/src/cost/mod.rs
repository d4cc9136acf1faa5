//! Cost Explorer tools: EC2 spend per instance type and a day-by-day
//! breakdown by region and service.

mod breakdown;
mod ec2_spend;
mod params;

pub use breakdown::{detailed_breakdown, CostBreakdownTool};
pub use ec2_spend::{summarize_ec2_spend, Ec2Spend, Ec2SpendTool, InstanceTypeSpend};
pub use params::{CostParams, CostToolInput};

use crate::aws::AwsClients;
use spendlens_core::{box_tools, DynTool};
use std::sync::Arc;

/// Returns all Cost Explorer tools
pub fn all_tools(clients: Arc<dyn AwsClients>) -> Vec<Box<dyn DynTool>> {
    box_tools![Ec2SpendTool::new(clients.clone()), CostBreakdownTool::new(clients)]
}
