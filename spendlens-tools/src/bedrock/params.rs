use crate::aws::AwsTarget;
use crate::params::{default_region, validate_account_id, validate_days, validate_region};
use crate::prelude::*;
use chrono::{DateTime, Duration, Utc};

/// Parameters for the Bedrock usage tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BedrockLogsParams {
    /// Number of days to look back (1-90)
    #[serde(default = "default_logs_days")]
    #[schemars(range(min = 1, max = 90))]
    pub days: u32,

    /// AWS region whose invocation logs are read
    #[serde(default = "default_region")]
    pub region: String,

    /// CloudWatch log group receiving Bedrock invocation logs. Defaults to
    /// the server's configured log group.
    #[serde(default)]
    pub log_group_name: Option<String>,

    /// AWS account id to report on, if different from the server's own
    /// account. Requires the cross-account role in that account.
    #[serde(default)]
    pub aws_account_id: Option<String>,
}

fn default_logs_days() -> u32 {
    7
}

impl Default for BedrockLogsParams {
    fn default() -> Self {
        Self {
            days: default_logs_days(),
            region: default_region(),
            log_group_name: None,
            aws_account_id: None,
        }
    }
}

impl BedrockLogsParams {
    pub fn validate(&self) -> Result<(), ToolError> {
        validate_days(self.days)?;
        validate_region(&self.region)?;
        validate_account_id(self.aws_account_id.as_deref())
    }

    pub fn target(&self) -> AwsTarget {
        AwsTarget::new(self.aws_account_id.clone(), self.region.clone())
    }

    /// The requested log group, or `default` when none (or a blank one) was given
    pub fn log_group<'a>(&'a self, default: &'a str) -> &'a str {
        self.log_group_name
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(default)
    }

    /// `[now - days, now]` in epoch milliseconds
    pub fn window_ms(&self, now: DateTime<Utc>) -> (i64, i64) {
        let start = now - Duration::days(i64::from(self.days));
        (start.timestamp_millis(), now.timestamp_millis())
    }
}

/// Tool input: the parameters travel under a `params` key.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BedrockToolInput {
    #[serde(default)]
    pub params: BedrockLogsParams,
}
