use super::params::CostToolInput;
use crate::aws::cost_explorer::{EC2_COMPUTE_SERVICE, UNBLENDED_COST, USAGE_QUANTITY};
use crate::aws::{AwsClients, CostDimension, CostPeriod, CostQuery};
use crate::prelude::*;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_CURRENCY: &str = "USD";

/// EC2 compute spend for one instance type over the whole period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceTypeSpend {
    pub instance_type: String,
    pub cost: f64,
    pub currency: String,
    pub usage: f64,
    pub usage_unit: String,
}

/// Result of `get_ec2_spend_last_day`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ec2Spend {
    pub start: String,
    pub end: String,
    /// Sorted by cost, most expensive first
    pub instance_types: Vec<InstanceTypeSpend>,
    /// Sum over instance types, or the period total when Cost Explorer
    /// returned no groups. `None` when there is nothing to report.
    pub total_cost: Option<f64>,
    pub currency: String,
    /// `None` when Cost Explorer returned no periods
    pub estimated: Option<bool>,
    pub results_by_time: Vec<CostPeriod>,
}

/// Fold daily Cost Explorer periods into per-instance-type spend.
pub fn summarize_ec2_spend(start: NaiveDate, end: NaiveDate, periods: Vec<CostPeriod>) -> Ec2Spend {
    let mut by_type: BTreeMap<String, InstanceTypeSpend> = BTreeMap::new();
    let mut currency: Option<String> = None;
    let mut period_total = None;

    for period in &periods {
        for group in &period.groups {
            let Some(instance_type) = group.keys.first() else {
                continue;
            };
            let cost = group.metric(UNBLENDED_COST);
            let usage = group.metric(USAGE_QUANTITY);
            if currency.is_none() {
                currency = cost.map(|c| c.unit.clone()).filter(|u| !u.is_empty());
            }

            let entry = by_type
                .entry(instance_type.clone())
                .or_insert_with(|| InstanceTypeSpend {
                    instance_type: instance_type.clone(),
                    cost: 0.0,
                    currency: cost
                        .map(|c| c.unit.clone())
                        .filter(|u| !u.is_empty())
                        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                    usage: 0.0,
                    usage_unit: usage.map(|u| u.unit.clone()).unwrap_or_default(),
                });
            entry.cost += cost.map(|c| c.amount).unwrap_or(0.0);
            entry.usage += usage.map(|u| u.amount).unwrap_or(0.0);
        }

        if period.groups.is_empty() {
            if let Some(total) = period.total.get(UNBLENDED_COST) {
                *period_total.get_or_insert(0.0) += total.amount;
                if currency.is_none() && !total.unit.is_empty() {
                    currency = Some(total.unit.clone());
                }
            }
        }
    }

    let mut instance_types: Vec<InstanceTypeSpend> = by_type.into_values().collect();
    instance_types.sort_by(|a, b| b.cost.total_cmp(&a.cost));

    let total_cost = if instance_types.is_empty() {
        period_total
    } else {
        Some(instance_types.iter().map(|i| i.cost).sum::<f64>() + period_total.unwrap_or(0.0))
    };

    let estimated = if periods.is_empty() {
        None
    } else {
        Some(periods.iter().any(|p| p.estimated))
    };

    Ec2Spend {
        start: start.format("%Y-%m-%d").to_string(),
        end: end.format("%Y-%m-%d").to_string(),
        instance_types,
        total_cost,
        currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        estimated,
        results_by_time: periods,
    }
}

/// Reports EC2 compute spend per instance type.
pub struct Ec2SpendTool {
    clients: Arc<dyn AwsClients>,
    today: Option<NaiveDate>,
}

impl Ec2SpendTool {
    pub fn new(clients: Arc<dyn AwsClients>) -> Self {
        Self {
            clients,
            today: None,
        }
    }

    /// Pin "today" instead of using the current UTC date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

impl Tool for Ec2SpendTool {
    type Input = CostToolInput;

    fn name(&self) -> &str {
        "get_ec2_spend_last_day"
    }

    fn description(&self) -> &str {
        "Retrieve EC2 compute spend (Amazon Elastic Compute Cloud - Compute) per instance type \
         from AWS Cost Explorer. Covers the last day by default; set params.days to look further \
         back. Returns cost, usage quantity, the overall total and whether figures are estimated."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let params = input.params;
        params.validate()?;

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = params.period(today);
        let query = CostQuery::daily(start, end)
            .metric(UNBLENDED_COST)
            .metric(USAGE_QUANTITY)
            .filter(CostDimension::Service, EC2_COMPUTE_SERVICE)
            .group_by(CostDimension::InstanceType);

        let client = self.clients.cost_explorer(&params.target()).await?;
        let periods = client.get_cost_and_usage(query).await?;
        let spend = summarize_ec2_spend(start, end, periods);

        for item in &spend.instance_types {
            tracing::info!(
                instance_type = %item.instance_type,
                cost = %format!("{:.4} {}", item.cost, item.currency),
                usage = %format!("{:.2}", item.usage),
                "EC2 spend"
            );
        }
        match spend.total_cost {
            Some(total) => tracing::info!(
                start = %spend.start,
                end = %spend.end,
                estimated = ?spend.estimated,
                "Total EC2 cost: {:.4} {}",
                total,
                spend.currency
            ),
            None => tracing::info!(start = %spend.start, end = %spend.end, "No EC2 costs found for this period"),
        }

        Ok(ToolResult::json(spend)?)
    }
}
