use crate::aws::AwsTarget;
use crate::params::{default_region, validate_account_id, validate_days, validate_region};
use crate::prelude::*;
use chrono::{Duration, NaiveDate};

/// Parameters for the Cost Explorer tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CostParams {
    /// Number of days to look back (1-90)
    #[serde(default = "default_cost_days")]
    #[schemars(range(min = 1, max = 90))]
    pub days: u32,

    /// AWS region for the Cost Explorer client
    #[serde(default = "default_region")]
    pub region: String,

    /// AWS account id to report on, if different from the server's own
    /// account. Requires the cross-account role in that account.
    #[serde(default)]
    pub aws_account_id: Option<String>,
}

fn default_cost_days() -> u32 {
    1
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            days: default_cost_days(),
            region: default_region(),
            aws_account_id: None,
        }
    }
}

impl CostParams {
    pub fn validate(&self) -> Result<(), ToolError> {
        validate_days(self.days)?;
        validate_region(&self.region)?;
        validate_account_id(self.aws_account_id.as_deref())
    }

    pub fn target(&self) -> AwsTarget {
        AwsTarget::new(self.aws_account_id.clone(), self.region.clone())
    }

    /// `[today - days, today)`
    pub fn period(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(i64::from(self.days)), today)
    }
}

/// Tool input: the parameters travel under a `params` key. Arguments
/// outside it are rejected rather than ignored.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CostToolInput {
    #[serde(default)]
    pub params: CostParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_input() {
        let input: CostToolInput = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(input.params, CostParams::default());
        assert_eq!(input.params.days, 1);
        assert_eq!(input.params.region, "us-east-1");

        let input: CostToolInput =
            serde_json::from_value(serde_json::json!({"params": {"days": 7}})).unwrap();
        assert_eq!(input.params.days, 7);
        assert_eq!(input.params.region, "us-east-1");
    }

    #[test]
    fn test_rejects_unwrapped_and_unknown_fields() {
        for value in [
            serde_json::json!({"days": 30}),
            serde_json::json!({"aws_account_id": "123456789012"}),
            serde_json::json!({"params": {"day": 3}}),
        ] {
            assert!(serde_json::from_value::<CostToolInput>(value.clone()).is_err(), "{}", value);
        }
    }

    #[test]
    fn test_period_is_end_exclusive() {
        let params = CostParams {
            days: 3,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = params.period(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 27).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn test_validate() {
        assert!(CostParams::default().validate().is_ok());

        let too_long = CostParams {
            days: 120,
            ..Default::default()
        };
        assert!(matches!(too_long.validate(), Err(ToolError::InvalidInput(_))));

        let bad_account = CostParams {
            aws_account_id: Some("abc".into()),
            ..Default::default()
        };
        assert!(bad_account.validate().is_err());
    }

    #[test]
    fn test_schema_nests_params() {
        let schema = serde_json::to_value(schemars::schema_for!(CostToolInput)).unwrap();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["params"].is_object());
    }
}
