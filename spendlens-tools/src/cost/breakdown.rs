use super::params::CostToolInput;
use crate::aws::cost_explorer::{EC2_COMPUTE_SERVICE, SAGEMAKER_SERVICE, UNBLENDED_COST};
use crate::aws::{AwsClients, AwsError, CostDimension, CostExplorerClient, CostQuery};
use crate::prelude::*;
use crate::table::{indent, render_table};
use chrono::{Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

/// Services shown per region before the rest are summarized
const TOP_SERVICES: usize = 5;

/// Services whose presence triggers the EC2 instance type breakdown
const EC2_SERVICE_PREFIX: &str = "Amazon Elastic Compute";

/// Render the day-by-day cost report for `[today - days, today)`.
///
/// Only the primary query is fatal. Follow-up breakdown queries that fail are
/// noted inline and the report carries on.
pub async fn detailed_breakdown(
    client: &dyn CostExplorerClient,
    days: u32,
    today: NaiveDate,
) -> Result<String, AwsError> {
    let start = today - Duration::days(i64::from(days));
    let query = CostQuery::daily(start, today)
        .metric(UNBLENDED_COST)
        .group_by(CostDimension::Region)
        .group_by(CostDimension::Service);
    let periods = client.get_cost_and_usage(query).await?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Detailed Cost Breakdown by Region, Service, and Instance Type ({} days):",
        days
    );
    let _ = writeln!(out, "{}", "-".repeat(75));

    for period in periods {
        let _ = writeln!(out, "\nDate: {}", period.start);
        let _ = writeln!(out, "{}", "=".repeat(50));

        if period.groups.is_empty() {
            let _ = writeln!(out, "No data found for this date");
        } else {
            // region -> service -> cost
            let mut regions: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
            let mut currency = String::from("USD");
            for group in &period.groups {
                let (Some(region), Some(service)) = (group.keys.first(), group.keys.get(1)) else {
                    continue;
                };
                let cost = group.metric(UNBLENDED_COST);
                if let Some(unit) = cost.map(|c| &c.unit).filter(|u| !u.is_empty()) {
                    currency = unit.clone();
                }
                *regions
                    .entry(region.clone())
                    .or_default()
                    .entry(service.clone())
                    .or_insert(0.0) += cost.map(|c| c.amount).unwrap_or(0.0);
            }

            let date = NaiveDate::parse_from_str(&period.start, "%Y-%m-%d").ok();
            for (region, services) in &regions {
                render_region(&mut out, client, date, region, services, &currency).await;
            }
        }

        let _ = writeln!(out, "\n{}", "-".repeat(75));
    }

    Ok(out.trim_end().to_string())
}

async fn render_region(
    out: &mut String,
    client: &dyn CostExplorerClient,
    date: Option<NaiveDate>,
    region: &str,
    services: &BTreeMap<String, f64>,
    currency: &str,
) {
    let _ = writeln!(out, "\nRegion: {}", region);
    let _ = writeln!(out, "{}", "-".repeat(40));

    let mut ranked: Vec<(&String, f64)> = services.iter().map(|(s, c)| (s, *c)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let rows = ranked
        .iter()
        .take(TOP_SERVICES)
        .map(|(service, cost)| vec![service.to_string(), format!("{:.2}", cost)])
        .collect();
    let _ = writeln!(out, "{}", render_table(&["Service", "Cost"], rows, 1));

    if ranked.len() > TOP_SERVICES {
        let rest: f64 = ranked[TOP_SERVICES..].iter().map(|(_, c)| c).sum();
        let _ = writeln!(
            out,
            "... and {} more services totaling {:.2} {}",
            ranked.len() - TOP_SERVICES,
            rest,
            currency
        );
    }

    let Some(date) = date else {
        return;
    };

    if services.keys().any(|s| s.starts_with(EC2_SERVICE_PREFIX)) {
        match service_breakdown(client, date, region, EC2_COMPUTE_SERVICE, CostDimension::InstanceType).await {
            Ok(Some(table)) => write_sub_table(out, "EC2 Instance Type Breakdown:", &table),
            Ok(None) => {}
            Err(e) => {
                let _ = writeln!(out, "  Note: Could not retrieve EC2 instance type breakdown: {}", e);
            }
        }
    }

    if services.contains_key(SAGEMAKER_SERVICE) {
        let result = async {
            if let Some(table) =
                service_breakdown(client, date, region, SAGEMAKER_SERVICE, CostDimension::InstanceType).await?
            {
                write_sub_table(out, "SageMaker Instance Type Breakdown:", &table);
            }
            if let Some(table) =
                service_breakdown(client, date, region, SAGEMAKER_SERVICE, CostDimension::UsageType).await?
            {
                write_sub_table(out, "SageMaker Usage Type Breakdown:", &table);
            }
            Ok::<_, AwsError>(())
        }
        .await;
        if let Err(e) = result {
            let _ = writeln!(out, "  Note: Could not retrieve SageMaker breakdown: {}", e);
        }
    }
}

fn write_sub_table(out: &mut String, title: &str, table: &str) {
    let _ = writeln!(out, "\n  {}", title);
    let _ = writeln!(out, "  {}", "-".repeat(38));
    let _ = writeln!(out, "{}", indent(table, "  "));
}

/// Cost of one service in one region on one day, grouped by `dimension`.
///
/// Returns `None` when Cost Explorer has no groups for that day.
async fn service_breakdown(
    client: &dyn CostExplorerClient,
    date: NaiveDate,
    region: &str,
    service: &str,
    dimension: CostDimension,
) -> Result<Option<String>, AwsError> {
    let query = CostQuery::daily(date, date + Duration::days(1))
        .metric(UNBLENDED_COST)
        .filter(CostDimension::Region, region)
        .filter(CostDimension::Service, service)
        .group_by(dimension);
    let periods = client.get_cost_and_usage(query).await?;

    let Some(first) = periods.first().filter(|p| !p.groups.is_empty()) else {
        return Ok(None);
    };

    let mut costs: Vec<(String, f64)> = first
        .groups
        .iter()
        .filter_map(|group| {
            let key = group.keys.first()?;
            let cost = group.metric(UNBLENDED_COST).map(|c| c.amount).unwrap_or(0.0);
            Some((key.clone(), cost))
        })
        .collect();
    costs.sort_by(|a, b| b.1.total_cmp(&a.1));

    let label = match dimension {
        CostDimension::InstanceType => "Instance Type",
        _ => "Usage Type",
    };
    let rows = costs
        .into_iter()
        .map(|(key, cost)| vec![key, format!("{:.2}", cost)])
        .collect();
    Ok(Some(render_table(&[label, "Cost"], rows, 1)))
}

/// Reports daily spend by region and service, drilling into EC2 and
/// SageMaker where they appear.
pub struct CostBreakdownTool {
    clients: Arc<dyn AwsClients>,
    today: Option<NaiveDate>,
}

impl CostBreakdownTool {
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

impl Tool for CostBreakdownTool {
    type Input = CostToolInput;

    fn name(&self) -> &str {
        "get_detailed_breakdown_by_day"
    }

    fn description(&self) -> &str {
        "Retrieve daily spend broken down by region and service from AWS Cost Explorer, with the \
         top services per region and instance type or usage type breakdowns for EC2 and \
         SageMaker. Set params.days to choose how many days to cover."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let params = input.params;
        params.validate()?;

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let client = self.clients.cost_explorer(&params.target()).await?;

        detailed_breakdown(client.as_ref(), params.days, today)
            .await
            .map(ToolResult::Text)
            .map_err(|e| ToolError::Custom(format!("Error retrieving detailed breakdown: {}", e)))
    }
}
