//! Test utilities for spendlens-tools.
//!
//! [`MockAwsClients`] stands in for AWS so tools and the server can be
//! exercised without credentials.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! spendlens-tools = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use spendlens_tools::test_utils::{cost_group, cost_period, MockAwsClients};
//!
//! let clients = MockAwsClients::new()
//!     .with_cost_response(|_query| {
//!         Ok(vec![cost_period("2024-05-01", "2024-05-02", vec![cost_group(&["m5.large"], 4.0)])])
//!     });
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::aws::cost_explorer::UNBLENDED_COST;
use crate::aws::{
    AwsClients, AwsError, AwsTarget, CostExplorerClient, CostGroup, CostPeriod, CostQuery,
    LogEvent, LogQuery, LogsClient, MetricAmount,
};

type CostResponder = dyn Fn(&CostQuery) -> Result<Vec<CostPeriod>, AwsError> + Send + Sync;

/// An [`AwsClients`] that answers from canned data and records every request.
///
/// By default Cost Explorer returns no periods, the invocation log is empty
/// and the caller account is `000000000000`.
#[derive(Clone)]
pub struct MockAwsClients {
    caller_account: String,
    cost_responder: Arc<CostResponder>,
    log_result: Result<Vec<LogEvent>, AwsError>,
    cost_queries: Arc<Mutex<Vec<CostQuery>>>,
    log_queries: Arc<Mutex<Vec<LogQuery>>>,
    targets: Arc<Mutex<Vec<AwsTarget>>>,
}

impl MockAwsClients {
    pub fn new() -> Self {
        Self {
            caller_account: "000000000000".to_string(),
            cost_responder: Arc::new(no_periods),
            log_result: Ok(Vec::new()),
            cost_queries: Arc::new(Mutex::new(Vec::new())),
            log_queries: Arc::new(Mutex::new(Vec::new())),
            targets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_caller_account(mut self, account_id: impl Into<String>) -> Self {
        self.caller_account = account_id.into();
        self
    }

    /// Answer every `GetCostAndUsage` call with `respond(query)`
    pub fn with_cost_response(
        mut self,
        respond: impl Fn(&CostQuery) -> Result<Vec<CostPeriod>, AwsError> + Send + Sync + 'static,
    ) -> Self {
        self.cost_responder = Arc::new(respond);
        self
    }

    /// Return these events from every `FilterLogEvents` call
    pub fn with_log_events(mut self, events: Vec<LogEvent>) -> Self {
        self.log_result = Ok(events);
        self
    }

    /// Fail every `FilterLogEvents` call with `error`
    pub fn with_logs_error(mut self, error: AwsError) -> Self {
        self.log_result = Err(error);
        self
    }

    pub fn cost_queries(&self) -> Vec<CostQuery> {
        self.cost_queries.lock().unwrap().clone()
    }

    pub fn log_queries(&self) -> Vec<LogQuery> {
        self.log_queries.lock().unwrap().clone()
    }

    /// Every target a client was requested for, in order
    pub fn targets(&self) -> Vec<AwsTarget> {
        self.targets.lock().unwrap().clone()
    }
}

fn no_periods(_query: &CostQuery) -> Result<Vec<CostPeriod>, AwsError> {
    Ok(Vec::new())
}

impl Default for MockAwsClients {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AwsClients for MockAwsClients {
    async fn caller_account(&self) -> Result<String, AwsError> {
        Ok(self.caller_account.clone())
    }

    async fn cost_explorer(
        &self,
        target: &AwsTarget,
    ) -> Result<Arc<dyn CostExplorerClient>, AwsError> {
        self.targets.lock().unwrap().push(target.clone());
        Ok(Arc::new(MockCostExplorer {
            responder: self.cost_responder.clone(),
            queries: self.cost_queries.clone(),
        }))
    }

    async fn logs(&self, target: &AwsTarget) -> Result<Arc<dyn LogsClient>, AwsError> {
        self.targets.lock().unwrap().push(target.clone());
        Ok(Arc::new(MockLogs {
            result: self.log_result.clone(),
            queries: self.log_queries.clone(),
        }))
    }
}

struct MockCostExplorer {
    responder: Arc<CostResponder>,
    queries: Arc<Mutex<Vec<CostQuery>>>,
}

#[async_trait]
impl CostExplorerClient for MockCostExplorer {
    async fn get_cost_and_usage(&self, query: CostQuery) -> Result<Vec<CostPeriod>, AwsError> {
        let result = (self.responder)(&query);
        self.queries.lock().unwrap().push(query);
        result
    }
}

struct MockLogs {
    result: Result<Vec<LogEvent>, AwsError>,
    queries: Arc<Mutex<Vec<LogQuery>>>,
}

#[async_trait]
impl LogsClient for MockLogs {
    async fn filter_log_events(&self, query: LogQuery) -> Result<Vec<LogEvent>, AwsError> {
        self.queries.lock().unwrap().push(query);
        self.result.clone()
    }
}

/// A group with an `UnblendedCost` in USD
pub fn cost_group(keys: &[&str], cost: f64) -> CostGroup {
    let mut metrics = BTreeMap::new();
    metrics.insert(
        UNBLENDED_COST.to_string(),
        MetricAmount {
            amount: cost,
            unit: "USD".to_string(),
        },
    );
    CostGroup {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        metrics,
    }
}

pub fn cost_period(start: &str, end: &str, groups: Vec<CostGroup>) -> CostPeriod {
    CostPeriod {
        start: start.to_string(),
        end: end.to_string(),
        estimated: false,
        total: BTreeMap::new(),
        groups,
    }
}

/// A model invocation log event as Bedrock writes it
pub fn invocation_event(
    timestamp: &str,
    region: &str,
    model_id: &str,
    user_arn: Option<&str>,
    input_tokens: u64,
    output_tokens: u64,
) -> LogEvent {
    let mut message = serde_json::json!({
        "schemaType": "ModelInvocationLog",
        "schemaVersion": "1.0",
        "timestamp": timestamp,
        "region": region,
        "operation": "Converse",
        "modelId": model_id,
        "input": {"inputContentType": "application/json", "inputTokenCount": input_tokens},
        "output": {"outputContentType": "application/json", "outputTokenCount": output_tokens},
    });
    if let Some(arn) = user_arn {
        message["identity"] = serde_json::json!({ "arn": arn });
    }
    LogEvent {
        timestamp_ms: None,
        message: message.to_string(),
    }
}
