//! Per-group token statistics over invocation records.

use super::record::InvocationRecord;
use std::collections::BTreeMap;

/// Sum, mean, max and median of one token column
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TokenStats {
    pub sum: u64,
    pub mean: f64,
    pub max: u64,
    pub median: f64,
}

impl TokenStats {
    fn from_values(mut values: Vec<u64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_unstable();

        let n = values.len();
        let sum = values.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        let median = if n % 2 == 1 {
            values[n / 2] as f64
        } else {
            (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
        };

        Self {
            sum,
            mean: sum as f64 / n as f64,
            max: values[n - 1],
            median,
        }
    }
}

/// Aggregates for one group of records
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupStats {
    pub requests: usize,
    pub input: TokenStats,
    pub completion: TokenStats,
    pub total: TokenStats,
}

impl GroupStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InvocationRecord>) -> Self {
        let mut input = Vec::new();
        let mut completion = Vec::new();
        let mut total = Vec::new();
        for record in records {
            input.push(record.input_tokens);
            completion.push(record.completion_tokens);
            total.push(record.total_tokens());
        }

        Self {
            requests: input.len(),
            input: TokenStats::from_values(input),
            completion: TokenStats::from_values(completion),
            total: TokenStats::from_values(total),
        }
    }
}

/// Group `records` by `key`, ordered by key. Records for which `key`
/// returns `None` are left out.
pub fn group_by<K, F>(records: &[InvocationRecord], key: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&InvocationRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&InvocationRecord>> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(record);
        }
    }
    groups
        .into_iter()
        .map(|(k, members)| (k, GroupStats::from_records(members)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(region: &str, model: &str, input: u64, completion: u64) -> InvocationRecord {
        InvocationRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            region: region.to_string(),
            model_id: model.to_string(),
            user: None,
            input_tokens: input,
            completion_tokens: completion,
        }
    }

    #[test]
    fn test_token_stats() {
        let stats = TokenStats::from_values(vec![10, 40, 20]);
        assert_eq!(stats.sum, 70);
        assert_eq!(stats.max, 40);
        assert_eq!(stats.median, 20.0);
        assert!((stats.mean - 23.333).abs() < 0.001);

        let even = TokenStats::from_values(vec![1, 2, 3, 10]);
        assert_eq!(even.median, 2.5);

        assert_eq!(TokenStats::from_values(vec![]), TokenStats::default());
    }

    #[test]
    fn test_sums_saturate() {
        let stats = TokenStats::from_values(vec![u64::MAX, u64::MAX, 1]);
        assert_eq!(stats.sum, u64::MAX);
        assert_eq!(stats.max, u64::MAX);

        let even = TokenStats::from_values(vec![u64::MAX, u64::MAX]);
        assert_eq!(even.median, u64::MAX as f64);

        let group = GroupStats::from_records(&[record("us-east-1", "a", u64::MAX, 1)]);
        assert_eq!(group.total.sum, u64::MAX);
    }

    #[test]
    fn test_group_by_orders_keys_and_counts() {
        let records = vec![
            record("us-west-2", "a", 100, 10),
            record("us-east-1", "a", 50, 5),
            record("us-west-2", "b", 0, 0),
        ];

        let by_region = group_by(&records, |r| Some(r.region.clone()));
        let keys: Vec<&String> = by_region.keys().collect();
        assert_eq!(keys, vec!["us-east-1", "us-west-2"]);

        let west = &by_region["us-west-2"];
        assert_eq!(west.requests, 2);
        assert_eq!(west.input.sum, 100);
        assert_eq!(west.completion.sum, 10);
        assert_eq!(west.total.sum, 110);
        assert_eq!(west.total.median, 55.0);
    }

    #[test]
    fn test_group_by_skips_missing_keys() {
        let mut with_user = record("us-east-1", "a", 1, 1);
        with_user.user = Some("arn:aws:iam::123456789012:user/bob".to_string());
        let records = vec![with_user, record("us-east-1", "a", 1, 1)];

        let by_user = group_by(&records, |r| r.user.clone());
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user.values().next().unwrap().requests, 1);
    }
}
