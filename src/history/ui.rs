//! UI formatting utilities for history display.
//!
//! This module turns records and statistics into human-readable strings for
//! history lists, detail panes, and summary banners.

use super::models::{CalculationRecord, CalculationType, Payload};
use super::stats::HistoryStats;
use chrono::{DateTime, Local, TimeDelta, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Formats a list of records for display in a list view.
///
/// Each record is formatted as: "Type Name - Employee (timestamp)"
/// Example: "GOSI Contribution - Ahmed Al-Saud (2025-01-15 14:30:45)"
pub fn format_history_list(records: &[CalculationRecord]) -> Vec<String> {
    records.iter().map(format_history_entry).collect()
}

/// Formats a single record for list display.
///
/// Format: "Type Name - Employee (timestamp)"; the employee part falls back
/// to the employee id, then to "Unassigned".
pub fn format_history_entry(record: &CalculationRecord) -> String {
    format!(
        "{} - {} ({})",
        record.calculation_type().display_name(),
        subject_label(record),
        format_timestamp(record.timestamp())
    )
}

/// Formats a record with relative time, for recent-history panels.
///
/// Format: "Type Name - Employee (relative time)"
pub fn format_history_entry_relative(record: &CalculationRecord, now: i64) -> String {
    format!(
        "{} - {} ({})",
        record.calculation_type().display_name(),
        subject_label(record),
        format_relative_time(record.timestamp(), now)
    )
}

/// Formats a record with all its inputs, outputs and metadata.
///
/// Payload fields are listed in key order.
pub fn format_history_details(record: &CalculationRecord) -> String {
    let mut output = String::new();

    output.push_str("═══════════════════════════════════════════════════════════\n");
    output.push_str(&format!("Record ID: {}\n", record.id()));
    output.push_str(&format!(
        "Type: {} ({})\n",
        record.calculation_type().display_name(),
        record.calculation_type()
    ));
    output.push_str(&format!(
        "Timestamp: {}\n",
        format_timestamp_detailed(record.timestamp())
    ));
    output.push_str("═══════════════════════════════════════════════════════════\n\n");

    output.push_str("INPUTS\n");
    output.push_str("───────────────────────────────────────────────────────────\n");
    push_payload(&mut output, record.inputs());

    output.push('\n');
    output.push_str("OUTPUTS\n");
    output.push_str("───────────────────────────────────────────────────────────\n");
    push_payload(&mut output, record.outputs());

    if let Some(metadata) = record.metadata() {
        output.push('\n');
        let fields = [
            ("Employee", &metadata.employee_name),
            ("Employee ID", &metadata.employee_id),
            ("Department", &metadata.department),
            ("Notes", &metadata.notes),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                output.push_str(&format!("{}: {}\n", label, value));
            }
        }
    }

    output.push_str("\n═══════════════════════════════════════════════════════════\n");

    output
}

fn push_payload(output: &mut String, payload: &Payload) {
    if payload.is_empty() {
        output.push_str("  [None]\n");
        return;
    }

    let sorted: BTreeMap<&String, &Value> = payload.iter().collect();
    for (key, value) in sorted {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        output.push_str(&format!("  {}: {}\n", key, rendered));
    }
}

fn subject_label(record: &CalculationRecord) -> String {
    record
        .metadata()
        .and_then(|m| m.employee_name.clone().or_else(|| m.employee_id.clone()))
        .unwrap_or_else(|| "Unassigned".to_string())
}

/// Formats an epoch-millisecond timestamp in local time.
///
/// Format: "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(timestamp: i64) -> String {
    to_local(timestamp).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a timestamp with its timezone offset.
///
/// Format: "YYYY-MM-DD HH:MM:SS +HH:MM"
pub fn format_timestamp_detailed(timestamp: i64) -> String {
    to_local(timestamp).format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

fn to_local(timestamp: i64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Formats a relative time description (e.g., "2 hours ago", "yesterday").
///
/// # Arguments
///
/// * `timestamp` - When the record was created, epoch milliseconds
/// * `now` - The reference time, epoch milliseconds
pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    // Imported timestamps may sit anywhere in the i64 range
    let duration = TimeDelta::try_milliseconds(now.saturating_sub(timestamp))
        .unwrap_or_else(TimeDelta::zero);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let minutes = duration.num_minutes();
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, plural(hours))
    } else if duration.num_days() < 7 {
        let days = duration.num_days();
        if days == 1 {
            return "yesterday".to_string();
        }
        format!("{} days ago", days)
    } else if duration.num_weeks() < 4 {
        let weeks = duration.num_weeks();
        format!("{} week{} ago", weeks, plural(weeks))
    } else if duration.num_days() < 365 {
        let months = duration.num_days() / 30;
        format!("{} month{} ago", months, plural(months))
    } else {
        let years = duration.num_days() / 365;
        format!("{} year{} ago", years, plural(years))
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Creates a summary line for history statistics.
///
/// Example: "Total: 12 | This week: 3 | This month: 9 | GOSI: 5, EOSB: 4, Leave: 3, Saudization: 0, Compliance: 0"
pub fn format_history_stats(stats: &HistoryStats) -> String {
    let per_type: Vec<String> = CalculationType::ALL
        .iter()
        .map(|t| format!("{}: {}", short_label(*t), stats.count_for(*t)))
        .collect();

    format!(
        "Total: {} | This week: {} | This month: {} | {}",
        stats.total,
        stats.last_week,
        stats.last_month,
        per_type.join(", ")
    )
}

fn short_label(calculation_type: CalculationType) -> &'static str {
    match calculation_type {
        CalculationType::Gosi => "GOSI",
        CalculationType::Eosb => "EOSB",
        CalculationType::Leave => "Leave",
        CalculationType::Saudization => "Saudization",
        CalculationType::Compliance => "Compliance",
    }
}

/// Groups records by local calendar date, newest date first.
pub fn format_history_grouped_by_date(records: &[CalculationRecord], now: i64) -> String {
    let mut grouped: BTreeMap<String, Vec<&CalculationRecord>> = BTreeMap::new();

    for record in records {
        let date_key = to_local(record.timestamp()).format("%Y-%m-%d").to_string();
        grouped.entry(date_key).or_default().push(record);
    }

    let mut output = String::new();

    for (date, date_records) in grouped.iter().rev() {
        output.push_str(&format!("\n{}\n", date));
        output.push_str(&"─".repeat(60));
        output.push('\n');

        for record in date_records {
            output.push_str(&format!(
                "  {}\n",
                format_history_entry_relative(record, now)
            ));
        }
    }

    output
}
