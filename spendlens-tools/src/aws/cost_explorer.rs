//! Cost Explorer `GetCostAndUsage` behind a mockable seam.

use super::error::{classify_aws_error, AwsError};
use async_trait::async_trait;
use aws_sdk_costexplorer::types::{
    DateInterval, Dimension, DimensionValues, Expression, Granularity, GroupDefinition,
    GroupDefinitionType, MetricValue, ResultByTime,
};
use aws_types::SdkConfig;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Service name Cost Explorer uses for EC2 instance usage
pub const EC2_COMPUTE_SERVICE: &str = "Amazon Elastic Compute Cloud - Compute";

/// Service name Cost Explorer uses for SageMaker
pub const SAGEMAKER_SERVICE: &str = "Amazon SageMaker";

pub const UNBLENDED_COST: &str = "UnblendedCost";
pub const USAGE_QUANTITY: &str = "UsageQuantity";

/// Cost Explorer dimensions used for grouping and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostDimension {
    Service,
    Region,
    InstanceType,
    UsageType,
}

impl CostDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostDimension::Service => "SERVICE",
            CostDimension::Region => "REGION",
            CostDimension::InstanceType => "INSTANCE_TYPE",
            CostDimension::UsageType => "USAGE_TYPE",
        }
    }
}

/// Restrict results to the given values of one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionFilter {
    pub dimension: CostDimension,
    pub values: Vec<String>,
}

/// A DAILY-granularity `GetCostAndUsage` request.
///
/// `end` is exclusive, matching the Cost Explorer API.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: Vec<String>,
    pub filters: Vec<DimensionFilter>,
    pub group_by: Vec<CostDimension>,
}

impl CostQuery {
    pub fn daily(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            metrics: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
        }
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    pub fn filter(mut self, dimension: CostDimension, value: impl Into<String>) -> Self {
        self.filters.push(DimensionFilter {
            dimension,
            values: vec![value.into()],
        });
        self
    }

    pub fn group_by(mut self, dimension: CostDimension) -> Self {
        self.group_by.push(dimension);
        self
    }

    /// Returns true when the query filters `dimension` to exactly `value`
    pub fn filters_on(&self, dimension: CostDimension, value: &str) -> bool {
        self.filters
            .iter()
            .any(|f| f.dimension == dimension && f.values.iter().any(|v| v == value))
    }
}

/// A metric amount as reported by Cost Explorer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAmount {
    pub amount: f64,
    pub unit: String,
}

/// One group in a period, keyed by the values of the grouping dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostGroup {
    pub keys: Vec<String>,
    pub metrics: BTreeMap<String, MetricAmount>,
}

impl CostGroup {
    pub fn metric(&self, name: &str) -> Option<&MetricAmount> {
        self.metrics.get(name)
    }
}

/// One `ResultsByTime` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostPeriod {
    pub start: String,
    pub end: String,
    pub estimated: bool,
    pub total: BTreeMap<String, MetricAmount>,
    pub groups: Vec<CostGroup>,
}

/// Read access to Cost Explorer
#[async_trait]
pub trait CostExplorerClient: Send + Sync {
    /// Run the query, following pagination, and return every period.
    async fn get_cost_and_usage(&self, query: CostQuery) -> Result<Vec<CostPeriod>, AwsError>;
}

/// [`CostExplorerClient`] backed by the AWS SDK
#[derive(Clone)]
pub struct SdkCostExplorerClient {
    client: aws_sdk_costexplorer::Client,
}

impl SdkCostExplorerClient {
    pub fn new(client: aws_sdk_costexplorer::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_costexplorer::Client::new(config))
    }
}

#[async_trait]
impl CostExplorerClient for SdkCostExplorerClient {
    async fn get_cost_and_usage(&self, query: CostQuery) -> Result<Vec<CostPeriod>, AwsError> {
        let time_period = DateInterval::builder()
            .start(query.start.format("%Y-%m-%d").to_string())
            .end(query.end.format("%Y-%m-%d").to_string())
            .build()
            .map_err(|e| AwsError::InvalidRequest(e.to_string()))?;
        let filter = build_filter(&query.filters);
        let group_by: Vec<GroupDefinition> = query
            .group_by
            .iter()
            .map(|dimension| {
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key(dimension.as_str())
                    .build()
            })
            .collect();

        let mut periods = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_cost_and_usage()
                .time_period(time_period.clone())
                .granularity(Granularity::Daily)
                .set_metrics(Some(query.metrics.clone()))
                .set_filter(filter.clone())
                .set_group_by((!group_by.is_empty()).then(|| group_by.clone()))
                .set_next_page_token(next_token.take())
                .send()
                .await
                .map_err(classify_aws_error)?;

            periods.extend(output.results_by_time().iter().map(convert_period));

            match output.next_page_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(
            start = %query.start,
            end = %query.end,
            periods = periods.len(),
            "fetched cost and usage"
        );
        Ok(periods)
    }
}

fn build_filter(filters: &[DimensionFilter]) -> Option<Expression> {
    let mut expressions: Vec<Expression> = filters
        .iter()
        .map(|filter| {
            Expression::builder()
                .dimensions(
                    DimensionValues::builder()
                        .key(Dimension::from(filter.dimension.as_str()))
                        .set_values(Some(filter.values.clone()))
                        .build(),
                )
                .build()
        })
        .collect();

    match expressions.len() {
        0 => None,
        1 => expressions.pop(),
        _ => Some(Expression::builder().set_and(Some(expressions)).build()),
    }
}

fn convert_period(result: &ResultByTime) -> CostPeriod {
    let (start, end) = result
        .time_period()
        .map(|p| (p.start().to_string(), p.end().to_string()))
        .unwrap_or_default();

    CostPeriod {
        start,
        end,
        estimated: result.estimated(),
        total: convert_metrics(result.total()),
        groups: result
            .groups()
            .iter()
            .map(|group| CostGroup {
                keys: group.keys().to_vec(),
                metrics: convert_metrics(group.metrics()),
            })
            .collect(),
    }
}

fn convert_metrics(metrics: Option<&HashMap<String, MetricValue>>) -> BTreeMap<String, MetricAmount> {
    metrics
        .into_iter()
        .flatten()
        .map(|(name, value)| {
            (
                name.clone(),
                MetricAmount {
                    amount: value
                        .amount()
                        .and_then(|a| a.parse::<f64>().ok())
                        .unwrap_or(0.0),
                    unit: value.unit().unwrap_or_default().to_string(),
                },
            )
        })
        .collect()
}
