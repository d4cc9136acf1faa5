//! Per-request AWS clients, with optional cross-account role assumption.
//!
//! A request may name an AWS account. When that account is not the one the
//! server's own credentials belong to, the server assumes
//! `arn:aws:iam::{account}:role/{role}` through STS and talks to the billing
//! and logging APIs with the temporary credentials.

use super::cost_explorer::{CostExplorerClient, SdkCostExplorerClient};
use super::error::{classify_aws_error, AwsError};
use super::logs::{LogsClient, SdkLogsClient};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_types::region::Region;
use aws_types::SdkConfig;
use std::sync::Arc;
use std::time::SystemTime;

/// Region used when neither the request nor the environment names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Role assumed in target accounts when `CROSS_ACCOUNT_ROLE_NAME` is unset
pub const DEFAULT_CROSS_ACCOUNT_ROLE: &str = "BedrockCrossAccount2";

/// STS session name for assumed-role sessions
pub const SESSION_NAME: &str = "CrossAccountSession";

/// Where a request should run: which account and which region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsTarget {
    account_id: Option<String>,
    pub region: String,
}

impl AwsTarget {
    /// Blank account ids mean "the server's own account".
    pub fn new(account_id: Option<String>, region: impl Into<String>) -> Self {
        let account_id = account_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            account_id,
            region: region.into(),
        }
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{}:role/{}", account_id, role_name)
}

/// Factory for the AWS service clients a tool call needs
#[async_trait]
pub trait AwsClients: Send + Sync {
    /// Account id of the server's own credentials
    async fn caller_account(&self) -> Result<String, AwsError>;

    async fn cost_explorer(
        &self,
        target: &AwsTarget,
    ) -> Result<Arc<dyn CostExplorerClient>, AwsError>;

    async fn logs(&self, target: &AwsTarget) -> Result<Arc<dyn LogsClient>, AwsError>;
}

/// [`AwsClients`] backed by the AWS SDK.
///
/// Nothing is cached: every call resolves the caller identity and, for a
/// foreign account, assumes the role again.
#[derive(Clone)]
pub struct SdkAwsClients {
    base: SdkConfig,
    sts: aws_sdk_sts::Client,
    role_name: String,
}

impl SdkAwsClients {
    /// Load credentials and region from the standard provider chain
    pub async fn from_env(role_name: impl Into<String>) -> Self {
        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        Self::new(base, role_name)
    }

    pub fn new(base: SdkConfig, role_name: impl Into<String>) -> Self {
        let sts = aws_sdk_sts::Client::new(&base);
        Self {
            base,
            sts,
            role_name: role_name.into(),
        }
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Build the SDK configuration for `target`.
    async fn config_for(&self, target: &AwsTarget) -> Result<SdkConfig, AwsError> {
        let builder = self
            .base
            .to_builder()
            .region(Region::new(target.region.clone()));

        let Some(account_id) = target.account_id() else {
            return Ok(builder.build());
        };

        let caller = self.caller_account().await?;
        if caller == account_id {
            tracing::debug!(account_id, "target is the caller's account");
            return Ok(builder.build());
        }

        let credentials = self.assume_role(account_id).await?;
        Ok(builder
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .build())
    }

    async fn assume_role(&self, account_id: &str) -> Result<Credentials, AwsError> {
        let arn = role_arn(account_id, &self.role_name);
        tracing::info!(role_arn = %arn, "assuming cross-account role");

        let output = self
            .sts
            .assume_role()
            .role_arn(&arn)
            .role_session_name(SESSION_NAME)
            .send()
            .await
            .map_err(|e| AwsError::CrossAccount(format!("{}: {}", arn, classify_aws_error(e))))?;

        let creds = output.credentials().ok_or_else(|| {
            AwsError::CrossAccount(format!("{}: STS returned no credentials", arn))
        })?;

        Ok(Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            SystemTime::try_from(*creds.expiration()).ok(),
            SESSION_NAME,
        ))
    }
}

#[async_trait]
impl AwsClients for SdkAwsClients {
    async fn caller_account(&self) -> Result<String, AwsError> {
        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(classify_aws_error)?;

        identity
            .account()
            .map(str::to_string)
            .ok_or_else(|| AwsError::Other("caller identity has no account".to_string()))
    }

    async fn cost_explorer(
        &self,
        target: &AwsTarget,
    ) -> Result<Arc<dyn CostExplorerClient>, AwsError> {
        let config = self.config_for(target).await?;
        Ok(Arc::new(SdkCostExplorerClient::from_sdk_config(&config)))
    }

    async fn logs(&self, target: &AwsTarget) -> Result<Arc<dyn LogsClient>, AwsError> {
        let config = self.config_for(target).await?;
        Ok(Arc::new(SdkLogsClient::from_sdk_config(&config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_account_means_caller() {
        assert_eq!(AwsTarget::new(None, "us-east-1").account_id(), None);
        assert_eq!(AwsTarget::new(Some(String::new()), "us-east-1").account_id(), None);
        assert_eq!(AwsTarget::new(Some("  ".into()), "us-east-1").account_id(), None);
        assert_eq!(
            AwsTarget::new(Some(" 123456789012 ".into()), "eu-west-1").account_id(),
            Some("123456789012")
        );
    }

    #[test]
    fn test_role_arn() {
        assert_eq!(
            role_arn("123456789012", DEFAULT_CROSS_ACCOUNT_ROLE),
            "arn:aws:iam::123456789012:role/BedrockCrossAccount2"
        );
    }
}
