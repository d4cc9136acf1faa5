use aws_sdk_costexplorer::error::SdkError;
use spendlens_core::ToolError;
use std::error::Error as StdError;
use thiserror::Error;

/// Failures from the AWS billing, logging and STS APIs, grouped by how a
/// caller should react to them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AwsError {
    /// Missing, expired or insufficient credentials
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The log group, stream or other named resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Assuming the role in the target account failed
    #[error("cross-account access failed: {0}")]
    CrossAccount(String),

    #[error("{0}")]
    Other(String),
}

impl From<AwsError> for ToolError {
    fn from(err: AwsError) -> Self {
        ToolError::Aws(err.to_string())
    }
}

/// Extract a readable error from an AWS SDK error.
///
/// Walks the error chain to find the most meaningful message and classifies
/// it into an [`AwsError`] variant.
pub(crate) fn classify_aws_error<E, R>(err: SdkError<E, R>) -> AwsError
where
    E: StdError + 'static,
    R: std::fmt::Debug,
{
    let mut messages = Vec::new();
    let err_ref: &dyn StdError = &err;
    collect_error_messages(err_ref, &mut messages);

    let root_message = messages
        .last()
        .cloned()
        .unwrap_or_else(|| "Unknown error".to_string());

    classify_error_message(&messages.join(" "), root_message)
}

/// Classify an error from the combined text of its chain.
///
/// Cost Explorer, CloudWatch Logs and STS share the common AWS error codes
/// (AccessDenied, Throttling, ServiceUnavailable). Service specific codes
/// handled here:
/// - ResourceNotFoundException (Logs): missing log group or stream
/// - DataUnavailableException, BillExpirationException (Cost Explorer): no
///   data for the requested period
/// - InvalidParameterException, ValidationException: malformed request
fn classify_error_message(combined: &str, root_message: String) -> AwsError {
    let lower = combined.to_lowercase();

    if lower.contains("unauthorized")
        || lower.contains("not authorized")
        || lower.contains("security token")
        || lower.contains("access denied")
        || lower.contains("accessdenied")
        || lower.contains("expired token")
        || lower.contains("expiredtoken")
        || lower.contains("credentials")
    {
        AwsError::Authentication(root_message)
    } else if lower.contains("throttl")
        || lower.contains("too many requests")
        || lower.contains("rate exceeded")
        || lower.contains("limit exceeded")
        || lower.contains("limitexceeded")
    {
        AwsError::RateLimited(root_message)
    } else if lower.contains("serviceunavailable")
        || lower.contains("service unavailable")
        || lower.contains("temporarily unavailable")
        || lower.contains("internalserver")
        || lower.contains("internal server error")
    {
        AwsError::ServiceUnavailable(root_message)
    } else if lower.contains("resourcenotfound")
        || lower.contains("does not exist")
        || lower.contains("not found")
    {
        AwsError::NotFound(root_message)
    } else if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
    {
        AwsError::Network(root_message)
    } else if lower.contains("validation")
        || lower.contains("invalidparameter")
        || lower.contains("invalid")
        || lower.contains("dataunavailable")
        || lower.contains("billexpiration")
    {
        AwsError::InvalidRequest(root_message)
    } else {
        AwsError::Other(root_message)
    }
}

/// Recursively collect error messages from an error chain
fn collect_error_messages(err: &dyn StdError, messages: &mut Vec<String>) {
    let msg = err.to_string();
    // Generic wrapper messages carry no detail
    if !msg.is_empty()
        && msg != "service error"
        && !msg.starts_with("dispatch failure")
        && !msg.starts_with("connector error")
        && !msg.starts_with("unhandled error")
    {
        messages.push(msg);
    }

    if let Some(source) = err.source() {
        collect_error_messages(source, messages);
    }
}
