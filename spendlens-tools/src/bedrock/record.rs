//! Parsing of Bedrock model invocation log records.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde_json::Value;

/// The fields of one invocation log record the usage reports need
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRecord {
    pub timestamp: DateTime<Utc>,
    pub region: String,
    pub model_id: String,
    /// Caller ARN, when the record carries an identity
    pub user: Option<String>,
    pub input_tokens: u64,
    pub completion_tokens: u64,
}

impl InvocationRecord {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.completion_tokens)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// `YYYY-MM-DD HH:00`
    pub fn hour_bucket(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:00").to_string()
    }

    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Parse one log message.
///
/// Returns `None` for messages that are not a JSON object, lack a string
/// `region` or `modelId`, or have no usable timestamp. Every other field is
/// read leniently: a malformed value is treated as absent. `event_ms` is the
/// CloudWatch event time, used when the record's own timestamp is missing or
/// not an RFC 3339 string.
pub fn parse_record(message: &str, event_ms: Option<i64>) -> Option<InvocationRecord> {
    let raw: Value = serde_json::from_str(message).ok()?;
    let raw = raw.as_object()?;

    let region = raw.get("region")?.as_str()?.to_string();
    let model_id = raw.get("modelId")?.as_str()?.to_string();

    let timestamp = raw
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|| event_ms.and_then(DateTime::from_timestamp_millis))?;

    let user = raw
        .get("identity")
        .and_then(|identity| identity.get("arn"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(InvocationRecord {
        timestamp,
        region,
        model_id,
        user,
        input_tokens: token_count(raw.get("input"), "inputTokenCount"),
        completion_tokens: token_count(raw.get("output"), "outputTokenCount"),
    })
}

/// A non-negative count, accepting floats; anything else is 0
fn token_count(section: Option<&Value>, field: &str) -> u64 {
    let Some(value) = section.and_then(|s| s.get(field)) else {
        return 0;
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
        .unwrap_or(0)
}

/// `anthropic.claude-3-haiku-20240307-v1:0` -> `claude-3-haiku-20240307-v1:0`,
/// `arn:aws:bedrock:...:inference-profile/abc` -> `abc`
pub fn short_model_id(model_id: &str) -> &str {
    let separator = if model_id.contains('.') { '.' } else { '/' };
    model_id.rsplit(separator).next().unwrap_or(model_id)
}
