use super::params::{BedrockLogsParams, BedrockToolInput};
use super::record::{parse_record, InvocationRecord};
use super::report::{daily_report, hourly_report, NO_USAGE_DATA};
use crate::aws::{AwsClients, AwsError, LogQuery, MODEL_INVOCATION_STREAM};
use crate::prelude::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Outcome of reading the invocation log for a request
#[derive(Debug)]
pub enum InvocationLog {
    Records(Vec<InvocationRecord>),
    /// The log group or the invocation stream does not exist
    Missing { log_group: String },
}

/// Read and parse every invocation record in the request's window.
pub async fn fetch_invocations(
    clients: &dyn AwsClients,
    params: &BedrockLogsParams,
    default_log_group: &str,
    now: DateTime<Utc>,
) -> Result<InvocationLog, ToolError> {
    let log_group = params.log_group(default_log_group).to_string();
    let (start_ms, end_ms) = params.window_ms(now);

    let client = clients.logs(&params.target()).await?;
    let query = LogQuery {
        log_group: log_group.clone(),
        log_stream: MODEL_INVOCATION_STREAM.to_string(),
        start_ms,
        end_ms,
    };

    let events = match client.filter_log_events(query).await {
        Ok(events) => events,
        Err(AwsError::NotFound(message)) => {
            tracing::warn!(%log_group, %message, "invocation log not found");
            return Ok(InvocationLog::Missing { log_group });
        }
        Err(e) => return Err(e.into()),
    };

    let total = events.len();
    let records: Vec<InvocationRecord> = events
        .into_iter()
        .filter_map(|event| parse_record(&event.message, event.timestamp_ms))
        .collect();
    tracing::debug!(%log_group, events = total, records = records.len(), "parsed invocation records");

    Ok(InvocationLog::Records(records))
}

fn no_data_message(log: &InvocationLog) -> String {
    match log {
        InvocationLog::Missing { log_group } => format!(
            "{}\nNote: log group '{}' or stream '{}' was not found.",
            NO_USAGE_DATA, log_group, MODEL_INVOCATION_STREAM
        ),
        InvocationLog::Records(_) => NO_USAGE_DATA.to_string(),
    }
}

/// State shared by the usage tools
struct UsageSource {
    clients: Arc<dyn AwsClients>,
    default_log_group: String,
    now: Option<DateTime<Utc>>,
}

impl UsageSource {
    /// Validated records for `params`, or the text to return when there are none
    async fn records(&self, params: &BedrockLogsParams) -> Result<Result<Vec<InvocationRecord>, String>, ToolError> {
        params.validate()?;
        let now = self.now.unwrap_or_else(Utc::now);
        let log = fetch_invocations(self.clients.as_ref(), params, &self.default_log_group, now).await?;
        Ok(match log {
            InvocationLog::Records(records) if !records.is_empty() => Ok(records),
            other => Err(no_data_message(&other)),
        })
    }
}

/// Daily Bedrock usage by region, model and user.
pub struct BedrockDailyUsageTool {
    source: UsageSource,
}

impl BedrockDailyUsageTool {
    pub fn new(clients: Arc<dyn AwsClients>, default_log_group: impl Into<String>) -> Self {
        Self {
            source: UsageSource {
                clients,
                default_log_group: default_log_group.into(),
                now: None,
            },
        }
    }

    /// Pin the end of the query window instead of using the current time
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.source.now = Some(now);
        self
    }
}

impl Tool for BedrockDailyUsageTool {
    type Input = BedrockToolInput;

    fn name(&self) -> &str {
        "get_bedrock_daily_usage_stats"
    }

    fn description(&self) -> &str {
        "Get daily Amazon Bedrock usage statistics from the model invocation logs: request counts \
         and input, completion and total token statistics by day, region and model, with region, \
         model and user summaries. Set params.days and params.region to choose the window."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let params = input.params;
        Ok(ToolResult::Text(match self.source.records(&params).await? {
            Ok(records) => daily_report(&records, params.days, &params.region),
            Err(message) => message,
        }))
    }
}

/// Hourly Bedrock usage, including an hour-of-day pattern.
pub struct BedrockHourlyUsageTool {
    source: UsageSource,
}

impl BedrockHourlyUsageTool {
    pub fn new(clients: Arc<dyn AwsClients>, default_log_group: impl Into<String>) -> Self {
        Self {
            source: UsageSource {
                clients,
                default_log_group: default_log_group.into(),
                now: None,
            },
        }
    }

    /// Pin the end of the query window instead of using the current time
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.source.now = Some(now);
        self
    }
}

impl Tool for BedrockHourlyUsageTool {
    type Input = BedrockToolInput;

    fn name(&self) -> &str {
        "get_bedrock_hourly_usage_stats"
    }

    fn description(&self) -> &str {
        "Get hourly Amazon Bedrock usage statistics from the model invocation logs: request counts \
         and token statistics per hour, per region and model, per user, and the usage pattern by \
         hour of day. Set params.days and params.region to choose the window."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let params = input.params;
        Ok(ToolResult::Text(match self.source.records(&params).await? {
            Ok(records) => hourly_report(&records, params.days, &params.region),
            Err(message) => message,
        }))
    }
}
