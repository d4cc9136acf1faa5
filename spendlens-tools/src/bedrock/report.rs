//! Text reports for the Bedrock usage tools.

use super::record::{short_model_id, InvocationRecord};
use super::stats::{group_by, GroupStats};
use crate::table::{decimal, render_table, thousands};
use std::collections::BTreeMap;

pub const NO_USAGE_DATA: &str = "No usage data found for the specified period.";

const FULL_STATS: &[&str] = &[
    "Requests",
    "Input Sum",
    "Input Mean",
    "Input Max",
    "Input Median",
    "Completion Sum",
    "Completion Mean",
    "Completion Max",
    "Completion Median",
    "Total Sum",
    "Total Mean",
    "Total Max",
    "Total Median",
];

const MEAN_STATS: &[&str] = &[
    "Requests",
    "Input Sum",
    "Input Mean",
    "Completion Sum",
    "Completion Mean",
    "Total Sum",
    "Total Mean",
];

const SUM_STATS: &[&str] = &["Requests", "Input Sum", "Completion Sum", "Total Sum"];

#[derive(Clone, Copy)]
enum Columns {
    Full,
    Means,
    Sums,
}

impl Columns {
    fn headers(self) -> &'static [&'static str] {
        match self {
            Columns::Full => FULL_STATS,
            Columns::Means => MEAN_STATS,
            Columns::Sums => SUM_STATS,
        }
    }

    fn cells(self, stats: &GroupStats) -> Vec<String> {
        let requests = thousands(stats.requests as u64);
        let (i, c, t) = (&stats.input, &stats.completion, &stats.total);
        match self {
            Columns::Full => vec![
                requests,
                thousands(i.sum),
                decimal(i.mean, 2),
                thousands(i.max),
                decimal(i.median, 1),
                thousands(c.sum),
                decimal(c.mean, 2),
                thousands(c.max),
                decimal(c.median, 1),
                thousands(t.sum),
                decimal(t.mean, 2),
                thousands(t.max),
                decimal(t.median, 1),
            ],
            Columns::Means => vec![
                requests,
                thousands(i.sum),
                decimal(i.mean, 2),
                thousands(c.sum),
                decimal(c.mean, 2),
                thousands(t.sum),
                decimal(t.mean, 2),
            ],
            Columns::Sums => vec![requests, thousands(i.sum), thousands(c.sum), thousands(t.sum)],
        }
    }
}

/// Render one grouped section as a table. `key_cells` turns a group key into
/// the leading columns named by `key_headers`.
fn stats_table<K>(
    key_headers: &[&str],
    groups: &BTreeMap<K, GroupStats>,
    key_cells: impl Fn(&K) -> Vec<String>,
    columns: Columns,
) -> String {
    let headers: Vec<&str> = key_headers
        .iter()
        .chain(columns.headers())
        .copied()
        .collect();
    let rows = groups
        .iter()
        .map(|(key, stats)| {
            let mut row = key_cells(key);
            row.extend(columns.cells(stats));
            row
        })
        .collect();
    render_table(&headers, rows, key_headers.len())
}

fn section(out: &mut Vec<String>, title: &str) {
    out.push(format!("\n=== {} ===", title));
}

fn summary_statistics(out: &mut Vec<String>, records: &[InvocationRecord]) {
    let overall = GroupStats::from_records(records);
    section(out, "Summary Statistics");
    out.push(format!("Total Requests: {}", thousands(overall.requests as u64)));
    out.push(format!("Total Input Tokens: {}", thousands(overall.input.sum)));
    out.push(format!("Total Completion Tokens: {}", thousands(overall.completion.sum)));
    out.push(format!("Total Tokens: {}", thousands(overall.total.sum)));
}

/// Region, model and user summaries shared by both reports
fn entity_summaries(out: &mut Vec<String>, records: &[InvocationRecord]) {
    section(out, "Region Summary");
    let by_region = group_by(records, |r| Some(r.region.clone()));
    out.push(stats_table(&["Region"], &by_region, |k| vec![k.clone()], Columns::Sums));

    section(out, "Model Summary");
    let by_model = group_by(records, |r| Some(short_model_id(&r.model_id).to_string()));
    out.push(stats_table(&["Model"], &by_model, |k| vec![k.clone()], Columns::Sums));

    section(out, "User Summary");
    let by_user = group_by(records, |r| r.user.clone());
    out.push(user_table(&["User"], &by_user, |k| vec![k.clone()], Columns::Sums));
}

/// Like [`stats_table`], but notes when no record carried a caller identity
fn user_table<K>(
    key_headers: &[&str],
    groups: &BTreeMap<K, GroupStats>,
    key_cells: impl Fn(&K) -> Vec<String>,
    columns: Columns,
) -> String {
    if groups.is_empty() {
        "No records with a caller identity".to_string()
    } else {
        stats_table(key_headers, groups, key_cells, columns)
    }
}

/// Usage by day, region and model, followed by the summaries.
///
/// `records` must not be empty; callers report [`NO_USAGE_DATA`] instead.
pub fn daily_report(records: &[InvocationRecord], days: u32, region: &str) -> String {
    let mut out = vec![
        format!("Bedrock Usage Statistics (Past {} days - {})", days, region),
        "=".repeat(80),
    ];

    section(&mut out, "Daily Region-wise -> Model-wise Analysis");
    let daily = group_by(records, |r| Some((r.date(), r.region.clone(), r.model_id.clone())));
    out.push(stats_table(
        &["Date", "Region", "Model"],
        &daily,
        |(date, region, model)| vec![date.to_string(), region.clone(), model.clone()],
        Columns::Full,
    ));

    summary_statistics(&mut out, records);
    entity_summaries(&mut out, records);

    section(&mut out, "Region -> User -> Model Detailed Summary");
    let detailed = group_by(records, |r| {
        let user = r.user.clone()?;
        Some((r.region.clone(), user, short_model_id(&r.model_id).to_string()))
    });
    out.push(user_table(
        &["Region", "User", "Model"],
        &detailed,
        |(region, user, model)| vec![region.clone(), user.clone(), model.clone()],
        Columns::Means,
    ));

    out.join("\n")
}

/// Usage by hour, with an hour-of-day pattern across the whole window.
///
/// `records` must not be empty; callers report [`NO_USAGE_DATA`] instead.
pub fn hourly_report(records: &[InvocationRecord], days: u32, region: &str) -> String {
    let mut out = vec![
        format!("Hourly Bedrock Usage Statistics (Past {} days - {})", days, region),
        "=".repeat(80),
    ];

    section(&mut out, "Hourly Usage Analysis");
    let hourly = group_by(records, |r| Some(r.hour_bucket()));
    out.push(stats_table(&["Hour"], &hourly, |k| vec![k.clone()], Columns::Means));

    section(&mut out, "Hourly Region-wise -> Model-wise Analysis");
    let by_model = group_by(records, |r| {
        Some((r.hour_bucket(), r.region.clone(), short_model_id(&r.model_id).to_string()))
    });
    out.push(stats_table(
        &["Hour", "Region", "Model"],
        &by_model,
        |(hour, region, model)| vec![hour.clone(), region.clone(), model.clone()],
        Columns::Full,
    ));

    summary_statistics(&mut out, records);
    entity_summaries(&mut out, records);

    section(&mut out, "Hourly Region -> User -> Model Detailed Summary");
    let detailed = group_by(records, |r| {
        let user = r.user.clone()?;
        Some((
            r.hour_bucket(),
            r.region.clone(),
            user,
            short_model_id(&r.model_id).to_string(),
        ))
    });
    out.push(user_table(
        &["Hour", "Region", "User", "Model"],
        &detailed,
        |(hour, region, user, model)| vec![hour.clone(), region.clone(), user.clone(), model.clone()],
        Columns::Means,
    ));

    section(&mut out, "Hourly Usage Pattern Analysis");
    let pattern = group_by(records, |r| Some(r.hour_of_day()));
    let rows = pattern
        .iter()
        .map(|(hour, stats)| {
            vec![
                format!("{:02}:00 - {:02}:59", hour, hour),
                thousands(stats.requests as u64),
                thousands(stats.input.sum),
                thousands(stats.total.sum),
            ]
        })
        .collect();
    out.push(render_table(
        &["Hour of Day", "Requests", "Input Sum", "Total Sum"],
        rows,
        1,
    ));

    out.join("\n")
}
