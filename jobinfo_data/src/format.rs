//! Display formatters. Each gets the value plus the whole merged record, for formatters whose
//! output depends on sibling fields.

use itertools::Itertools as _;

use crate::{
    field,
    misc::parsing::SlurmDuration,
    record::MergedRecord,
    value::{TimeSpan, Value, UNLIMITED},
};

pub type Format = fn(&Value, &MergedRecord) -> String;

/// Rendered for durations that are zero and ratios without a base.
pub const PLACEHOLDER: &str = "--";

const DISPLAY_DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Durations rendered with [`time`] share a day column sized to the largest of these.
const TIME_ALIGNED: [&str; 3] = [field::TIME_LIMIT, field::ELAPSED, field::TOTAL_CPU];

pub fn plain(value: &Value, _: &MergedRecord) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Count(count) => count.to_string(),
        Value::Bytes(size) => size.to_human(),
        Value::Time(span) => clock(span.duration(), 0),
        Value::Date(date) => date.to_string(),
    }
}

/// Drops `COMPLETED` when other states were seen too, then appends what `squeue` reported.
pub fn state(value: &Value, record: &MergedRecord) -> String {
    let states = value.as_text().split(',').filter(|state| !state.is_empty()).collect_vec();
    let mut out = if states.len() > 1 {
        states.into_iter().filter(|&state| state != "COMPLETED").join(",")
    } else {
        states.join(",")
    };

    if !record.reason.is_empty() {
        out.push_str(&format!(" ({})", record.reason));
    }
    if !record.dependencies.is_empty() {
        out.push_str(&format!(", depends on {}", record.dependencies));
    }
    out
}

pub fn date(value: &Value, record: &MergedRecord) -> String {
    match value {
        Value::Date(date) if date.is_unset() => PLACEHOLDER.to_owned(),
        Value::Date(date) => date
            .to_datetime()
            .map_or_else(|| date.to_string(), |dt| dt.format(DISPLAY_DATE_FMT).to_string()),
        other => plain(other, record),
    }
}

/// `[D-]HH:MM:SS`, day column aligned across [`TIME_ALIGNED`], `--` for zero.
pub fn time(value: &Value, record: &MergedRecord) -> String {
    match value.as_time() {
        TimeSpan::Unlimited => UNLIMITED.to_owned(),
        span if span.duration().is_zero() => PLACEHOLDER.to_owned(),
        span => clock(span.duration(), day_width(record)),
    }
}

/// Share of `TotalCPU`.
pub fn cpu_share(value: &Value, record: &MergedRecord) -> String {
    let total = record
        .get(field::TOTAL_CPU)
        .map(|total| total.as_time().duration().total_millis())
        .unwrap_or(0);
    if total == 0 {
        return PLACEHOLDER.to_owned();
    }
    let part = value.as_time().duration().total_millis();
    format!("{:.1}%", part as f64 * 100f64 / total as f64)
}

/// `4000Mc` is `4000M/core`, `4000Mn` is `4000M/node`.
pub fn mem_request(value: &Value, _: &MergedRecord) -> String {
    let text = value.as_text();
    if let Some(amount) = text.strip_suffix('c') {
        format!("{amount}/core")
    } else if let Some(amount) = text.strip_suffix('n') {
        format!("{amount}/node")
    } else {
        text.to_owned()
    }
}

pub fn max_rss(value: &Value, record: &MergedRecord) -> String {
    bytes_on_nodes(value, record, field::MAX_RSS_NODE)
}

pub fn max_disk_write(value: &Value, record: &MergedRecord) -> String {
    bytes_on_nodes(value, record, field::MAX_DISK_WRITE_NODE)
}

pub fn max_disk_read(value: &Value, record: &MergedRecord) -> String {
    bytes_on_nodes(value, record, field::MAX_DISK_READ_NODE)
}

/// `1.50G (node03)`
fn bytes_on_nodes(value: &Value, record: &MergedRecord, node_field: &str) -> String {
    let size = value.as_bytes().to_human();
    match record.get(node_field).map(Value::as_text) {
        Some(nodes) if !nodes.is_empty() => format!("{size} ({nodes})"),
        _ => size,
    }
}

/// Digits of the largest day count among the aligned durations, 0 if none spans a day.
fn day_width(record: &MergedRecord) -> usize {
    TIME_ALIGNED
        .iter()
        .filter_map(|name| record.get(name))
        .map(|value| SlurmDuration::from_millis(value.as_time().duration().total_millis()).days)
        .max()
        .filter(|&days| days > 0)
        .map_or(0, |days| days.to_string().len())
}

fn clock(duration: SlurmDuration, day_width: usize) -> String {
    let SlurmDuration {
        days,
        hours,
        minutes,
        seconds,
        ..
    } = SlurmDuration::from_millis(duration.total_millis());
    let hms = format!("{hours:02}:{minutes:02}:{seconds:02}");
    match (day_width, days) {
        (0, 0) => hms,
        (0, days) => format!("{days}-{hms}"),
        (width, 0) => format!("{:width$} {hms}", ""),
        (width, days) => format!("{days:>width$}-{hms}"),
    }
}
