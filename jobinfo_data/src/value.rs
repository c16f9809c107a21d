use std::cmp::Ordering;

use derive_more::derive::From;

use crate::misc::parsing::{ByteSize, SlurmDuration, Timestamp};

/// Printed for time limits without an upper bound.
pub const UNLIMITED: &str = "UNLIMITED";
/// Printed for time fields Slurm could not compute.
pub const INVALID: &str = "INVALID";

/// A time field: a concrete span, or one of the sentinels Slurm prints instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSpan {
    /// Empty, `INVALID` or unparseable.
    #[default]
    Unset,
    Unlimited,
    Span(SlurmDuration),
}

impl TimeSpan {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | INVALID => TimeSpan::Unset,
            UNLIMITED => TimeSpan::Unlimited,
            text => SlurmDuration::try_parse(text).map_or(TimeSpan::Unset, TimeSpan::Span),
        }
    }

    /// The concrete span, zero for both sentinels.
    pub fn duration(&self) -> SlurmDuration {
        match self {
            TimeSpan::Span(dur) => *dur,
            TimeSpan::Unset | TimeSpan::Unlimited => SlurmDuration::ZERO,
        }
    }

    /// Numeric ordering of two concrete spans, `None` if either side is a sentinel.
    pub fn cmp_span(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (TimeSpan::Span(a), TimeSpan::Span(b)) => Some(a.total_millis().cmp(&b.total_millis())),
            _ => None,
        }
    }
}

/// One typed field value. Which variant a field holds is fixed by its parser.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Value {
    Text(String),
    Count(u64),
    Bytes(ByteSize),
    Time(TimeSpan),
    Date(Timestamp),
}

impl Value {
    /// True for the value every parser returns on empty input.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::Count(count) => *count == 0,
            Value::Bytes(size) => size.as_bytes() == 0,
            Value::Time(span) => *span == TimeSpan::Unset,
            Value::Date(date) => date.is_unset(),
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Value::Text(text) => text,
            _ => "",
        }
    }

    pub fn as_count(&self) -> u64 {
        match self {
            Value::Count(count) => *count,
            _ => 0,
        }
    }

    pub fn as_bytes(&self) -> ByteSize {
        match self {
            Value::Bytes(size) => *size,
            _ => ByteSize(0),
        }
    }

    pub fn as_time(&self) -> TimeSpan {
        match self {
            Value::Time(span) => *span,
            _ => TimeSpan::Unset,
        }
    }
}
