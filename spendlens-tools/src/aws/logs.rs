use super::error::{classify_aws_error, AwsError};
use async_trait::async_trait;
use aws_types::SdkConfig;

/// Log stream Bedrock writes model invocation records to
pub const MODEL_INVOCATION_STREAM: &str = "aws/bedrock/modelinvocations";

/// A `FilterLogEvents` request over one stream of one group.
///
/// Times are epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    pub log_group: String,
    pub log_stream: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp_ms: Option<i64>,
    pub message: String,
}

/// Read access to CloudWatch Logs
#[async_trait]
pub trait LogsClient: Send + Sync {
    /// Return every event in the window, following pagination.
    ///
    /// A missing log group or stream is reported as [`AwsError::NotFound`].
    async fn filter_log_events(&self, query: LogQuery) -> Result<Vec<LogEvent>, AwsError>;
}

/// [`LogsClient`] backed by the AWS SDK
#[derive(Clone)]
pub struct SdkLogsClient {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl SdkLogsClient {
    pub fn new(client: aws_sdk_cloudwatchlogs::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_cloudwatchlogs::Client::new(config))
    }
}

#[async_trait]
impl LogsClient for SdkLogsClient {
    async fn filter_log_events(&self, query: LogQuery) -> Result<Vec<LogEvent>, AwsError> {
        let mut events = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .filter_log_events()
                .log_group_name(&query.log_group)
                .log_stream_names(&query.log_stream)
                .start_time(query.start_ms)
                .end_time(query.end_ms)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|err| {
                    let not_found = err
                        .as_service_error()
                        .map(|e| e.is_resource_not_found_exception())
                        .unwrap_or(false);
                    if not_found {
                        AwsError::NotFound(format!(
                            "log group {} or stream {} does not exist",
                            query.log_group, query.log_stream
                        ))
                    } else {
                        classify_aws_error(err)
                    }
                })?;

            events.extend(output.events().iter().filter_map(|event| {
                event.message().map(|message| LogEvent {
                    timestamp_ms: event.timestamp(),
                    message: message.to_string(),
                })
            }));

            match output.next_token() {
                // The token repeats once the end of the stream is reached
                Some(token) if Some(token) != next_token.as_deref() => {
                    next_token = Some(token.to_string())
                }
                _ => break,
            }
        }

        tracing::debug!(
            log_group = %query.log_group,
            events = events.len(),
            "fetched log events"
        );
        Ok(events)
    }
}
