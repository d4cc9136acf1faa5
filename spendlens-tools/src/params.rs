//! Validation shared by the tool parameter types.

use crate::aws::session::DEFAULT_REGION;
use spendlens_core::ToolError;

/// Longest look-back window any tool accepts
pub const MAX_DAYS: u32 = 90;

pub(crate) fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

pub(crate) fn validate_days(days: u32) -> Result<(), ToolError> {
    if (1..=MAX_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(ToolError::InvalidInput(format!(
            "days must be between 1 and {}, got {}",
            MAX_DAYS, days
        )))
    }
}

pub(crate) fn validate_region(region: &str) -> Result<(), ToolError> {
    let valid = !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ToolError::InvalidInput(format!(
            "'{}' is not a valid AWS region",
            region
        )))
    }
}

/// Blank ids are allowed and mean the server's own account.
pub(crate) fn validate_account_id(account_id: Option<&str>) -> Result<(), ToolError> {
    match account_id.map(str::trim) {
        None | Some("") => Ok(()),
        Some(id) if id.len() == 12 && id.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        Some(id) => Err(ToolError::InvalidInput(format!(
            "aws_account_id must be a 12-digit AWS account id, got '{}'",
            id
        ))),
    }
}
