// SDK-backed clients against a local fake of the AWS JSON and query APIs.
//
// One wiremock server stands in for STS, Cost Explorer and CloudWatch Logs;
// requests are told apart by the `x-amz-target` header or the STS action.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_smithy_types::retry::RetryConfig;
use aws_types::region::Region;
use aws_types::SdkConfig;
use chrono::NaiveDate;
use serde_json::json;
use spendlens_tools::aws::cost_explorer::{EC2_COMPUTE_SERVICE, UNBLENDED_COST};
use spendlens_tools::aws::{
    AwsClients, AwsError, AwsTarget, CostDimension, CostExplorerClient, CostQuery, LogQuery,
    LogsClient, SdkAwsClients, SdkCostExplorerClient, SdkLogsClient, MODEL_INVOCATION_STREAM,
};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AWS_JSON: &str = "application/x-amz-json-1.1";
const CE_TARGET: &str = "AWSInsightsIndexService.GetCostAndUsage";
const LOGS_TARGET: &str = "Logs_20140328.FilterLogEvents";

async fn sdk_config(server: &MockServer) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(server.uri())
        .credentials_provider(Credentials::new("AKIDTEST", "SECRET", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}

fn aws_json(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), AWS_JSON)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ec2_query() -> CostQuery {
    CostQuery::daily(date("2024-05-01"), date("2024-05-03"))
        .metric(UNBLENDED_COST)
        .filter(CostDimension::Service, EC2_COMPUTE_SERVICE)
        .group_by(CostDimension::InstanceType)
}

fn ce_period(start: &str, end: &str, instance_type: &str, amount: &str) -> serde_json::Value {
    json!({
        "TimePeriod": {"Start": start, "End": end},
        "Total": {},
        "Groups": [{
            "Keys": [instance_type],
            "Metrics": {"UnblendedCost": {"Amount": amount, "Unit": "USD"}}
        }],
        "Estimated": false
    })
}

#[tokio::test]
async fn test_cost_explorer_follows_next_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", CE_TARGET))
        .and(body_partial_json(json!({"NextPageToken": "page-2"})))
        .respond_with(aws_json(
            200,
            json!({"ResultsByTime": [ce_period("2024-05-02", "2024-05-03", "t3.micro", "0.25")]}),
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", CE_TARGET))
        .and(body_partial_json(json!({
            "Granularity": "DAILY",
            "TimePeriod": {"Start": "2024-05-01", "End": "2024-05-03"},
            "Metrics": ["UnblendedCost"],
            "GroupBy": [{"Type": "DIMENSION", "Key": "INSTANCE_TYPE"}],
            "Filter": {"Dimensions": {"Key": "SERVICE", "Values": [EC2_COMPUTE_SERVICE]}}
        })))
        .respond_with(aws_json(
            200,
            json!({
                "ResultsByTime": [ce_period("2024-05-01", "2024-05-02", "m5.large", "2.5")],
                "NextPageToken": "page-2"
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = SdkCostExplorerClient::from_sdk_config(&sdk_config(&server).await);
    let periods = client.get_cost_and_usage(ec2_query()).await.unwrap();

    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0].start, "2024-05-01");
    assert_eq!(periods[0].groups[0].keys, vec!["m5.large"]);
    assert_eq!(periods[0].groups[0].metric(UNBLENDED_COST).unwrap().amount, 2.5);
    assert_eq!(periods[1].groups[0].keys, vec!["t3.micro"]);
    assert!(!periods[1].estimated);
}

#[tokio::test]
async fn test_cost_explorer_throttling_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", CE_TARGET))
        .respond_with(aws_json(
            400,
            json!({"__type": "LimitExceededException", "message": "Rate exceeded"}),
        ))
        .mount(&server)
        .await;

    let client = SdkCostExplorerClient::from_sdk_config(&sdk_config(&server).await);
    let err = client.get_cost_and_usage(ec2_query()).await.unwrap_err();
    assert!(matches!(err, AwsError::RateLimited(_)), "got {:?}", err);
}

fn log_query() -> LogQuery {
    LogQuery {
        log_group: "BedrockModelInvocationLogGroup".to_string(),
        log_stream: MODEL_INVOCATION_STREAM.to_string(),
        start_ms: 1_714_521_600_000,
        end_ms: 1_715_126_400_000,
    }
}

#[tokio::test]
async fn test_logs_follow_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", LOGS_TARGET))
        .and(body_partial_json(json!({"nextToken": "tok-2"})))
        .respond_with(aws_json(
            200,
            json!({"events": [{"timestamp": 1_714_525_200_000i64, "message": "second"}]}),
        ))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", LOGS_TARGET))
        .and(body_partial_json(json!({
            "logGroupName": "BedrockModelInvocationLogGroup",
            "logStreamNames": [MODEL_INVOCATION_STREAM],
            "startTime": 1_714_521_600_000i64,
            "endTime": 1_715_126_400_000i64
        })))
        .respond_with(aws_json(
            200,
            json!({
                "events": [
                    {"timestamp": 1_714_521_600_000i64, "message": "first"},
                    {"timestamp": 1_714_521_700_000i64}
                ],
                "nextToken": "tok-2"
            }),
        ))
        .mount(&server)
        .await;

    let client = SdkLogsClient::from_sdk_config(&sdk_config(&server).await);
    let events = client.filter_log_events(log_query()).await.unwrap();

    // Events without a message are dropped
    let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second"]);
    assert_eq!(events[0].timestamp_ms, Some(1_714_521_600_000));
}

#[tokio::test]
async fn test_missing_log_group_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", LOGS_TARGET))
        .respond_with(aws_json(
            400,
            json!({
                "__type": "ResourceNotFoundException",
                "message": "The specified log group does not exist."
            }),
        ))
        .mount(&server)
        .await;

    let client = SdkLogsClient::from_sdk_config(&sdk_config(&server).await);
    let err = client.filter_log_events(log_query()).await.unwrap_err();
    match err {
        AwsError::NotFound(message) => {
            assert!(message.contains("BedrockModelInvocationLogGroup"));
            assert!(message.contains(MODEL_INVOCATION_STREAM));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

const CALLER_IDENTITY: &str = r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:iam::111111111111:user/cost-server</Arn>
    <UserId>AIDAEXAMPLEUSERID</UserId>
    <Account>111111111111</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata>
    <RequestId>01234567-89ab-cdef-0123-456789abcdef</RequestId>
  </ResponseMetadata>
</GetCallerIdentityResponse>"#;

const ASSUME_ROLE: &str = r#"<AssumeRoleResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleResult>
    <Credentials>
      <AccessKeyId>ASIATEMP</AccessKeyId>
      <SecretAccessKey>tempsecret</SecretAccessKey>
      <SessionToken>temptoken</SessionToken>
      <Expiration>2030-01-01T00:00:00Z</Expiration>
    </Credentials>
    <AssumedRoleUser>
      <Arn>arn:aws:sts::222222222222:assumed-role/BedrockCrossAccount2/CrossAccountSession</Arn>
      <AssumedRoleId>AROAEXAMPLEROLEID:CrossAccountSession</AssumedRoleId>
    </AssumedRoleUser>
  </AssumeRoleResult>
  <ResponseMetadata>
    <RequestId>fedcba98-7654-3210-fedc-ba9876543210</RequestId>
  </ResponseMetadata>
</AssumeRoleResponse>"#;

async fn mount_sts(server: &MockServer, expected_assumes: u64) {
    Mock::given(method("POST"))
        .and(body_string_contains("Action=GetCallerIdentity"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CALLER_IDENTITY, "text/xml"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("Action=AssumeRole"))
        .and(body_string_contains("BedrockCrossAccount2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ASSUME_ROLE, "text/xml"))
        .expect(expected_assumes)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_foreign_account_uses_assumed_role_credentials() {
    let server = MockServer::start().await;
    mount_sts(&server, 1).await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", CE_TARGET))
        .and(header("x-amz-security-token", "temptoken"))
        .respond_with(aws_json(200, json!({"ResultsByTime": []})))
        .expect(1)
        .mount(&server)
        .await;

    let clients = SdkAwsClients::new(sdk_config(&server).await, "BedrockCrossAccount2");
    assert_eq!(clients.caller_account().await.unwrap(), "111111111111");

    let target = AwsTarget::new(Some("222222222222".to_string()), "us-east-1");
    let client = clients.cost_explorer(&target).await.unwrap();
    let periods = client.get_cost_and_usage(ec2_query()).await.unwrap();
    assert!(periods.is_empty());
}

#[tokio::test]
async fn test_own_account_skips_assume_role() {
    let server = MockServer::start().await;
    mount_sts(&server, 0).await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", CE_TARGET))
        .respond_with(aws_json(200, json!({"ResultsByTime": []})))
        .expect(2)
        .mount(&server)
        .await;

    let clients = SdkAwsClients::new(sdk_config(&server).await, "BedrockCrossAccount2");

    let same_account = AwsTarget::new(Some("111111111111".to_string()), "us-east-1");
    let client = clients.cost_explorer(&same_account).await.unwrap();
    client.get_cost_and_usage(ec2_query()).await.unwrap();

    let no_account = AwsTarget::new(None, "us-east-1");
    let client = clients.cost_explorer(&no_account).await.unwrap();
    client.get_cost_and_usage(ec2_query()).await.unwrap();
}

#[tokio::test]
async fn test_assume_role_failure_is_cross_account_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("Action=GetCallerIdentity"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CALLER_IDENTITY, "text/xml"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("Action=AssumeRole"))
        .respond_with(ResponseTemplate::new(403).set_body_raw(
            r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type>Sender</Type>
    <Code>AccessDenied</Code>
    <Message>User is not authorized to perform: sts:AssumeRole</Message>
  </Error>
  <RequestId>00000000-0000-0000-0000-000000000000</RequestId>
</ErrorResponse>"#,
            "text/xml",
        ))
        .mount(&server)
        .await;

    let clients = SdkAwsClients::new(sdk_config(&server).await, "BedrockCrossAccount2");
    let target = AwsTarget::new(Some("222222222222".to_string()), "us-east-1");

    let err = match clients.logs(&target).await {
        Ok(_) => panic!("expected the role assumption to fail"),
        Err(err) => err,
    };
    match err {
        AwsError::CrossAccount(message) => {
            assert!(message.contains("arn:aws:iam::222222222222:role/BedrockCrossAccount2"));
        }
        other => panic!("expected CrossAccount, got {:?}", other),
    }
}
