//! Binary operators that pick the "best" of two observations of the same field.
//!
//! Every combinator treats the zero value of its type (what the parser returns for `""`) as a
//! no-op operand: live rows are padded with zero values for the fields they do not carry, and
//! folding those in must never clobber a historical value. A variant mismatch keeps `a`.

use std::cmp::Ordering;

use itertools::Itertools as _;

use crate::value::{TimeSpan, Value};

pub type Combine = fn(&Value, &Value) -> Value;

/// `a` unless it is empty, else `b`.
pub fn keep_first(a: &Value, b: &Value) -> Value {
    if a.is_zero() {
        b.clone()
    } else {
        a.clone()
    }
}

/// Sorted, deduplicated union of two comma separated token sets.
pub fn append(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Text(a), Value::Text(b)) => Value::Text(
            a.split(',')
                .chain(b.split(','))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .sorted()
                .dedup()
                .join(","),
        ),
        _ => a.clone(),
    }
}

pub fn max(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Count(x), Value::Count(y)) => Value::Count(*x.max(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Value::Bytes(*x.max(y)),
        _ => a.clone(),
    }
}

/// `UNLIMITED` absorbs, unset is the identity, spans compare by their length.
pub fn time_max(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Time(x), Value::Time(y)) => Value::Time(match (x, y) {
            (TimeSpan::Unlimited, _) | (_, TimeSpan::Unlimited) => TimeSpan::Unlimited,
            (TimeSpan::Unset, other) | (other, TimeSpan::Unset) => *other,
            _ => match x.cmp_span(y) {
                Some(Ordering::Less) => *y,
                _ => *x,
            },
        }),
        _ => a.clone(),
    }
}

/// Unset is the identity, any concrete span beats `UNLIMITED`.
pub fn time_min(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Time(x), Value::Time(y)) => Value::Time(match (x, y) {
            (TimeSpan::Unset, other) | (other, TimeSpan::Unset) => *other,
            (TimeSpan::Unlimited, other) | (other, TimeSpan::Unlimited) => *other,
            _ => match x.cmp_span(y) {
                Some(Ordering::Greater) => *y,
                _ => *x,
            },
        }),
        _ => a.clone(),
    }
}

/// Unset never wins, even against text that sorts after it.
pub fn date_min(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Date(x), Value::Date(y)) if x.is_unset() => Value::Date(y.clone()),
        (Value::Date(x), Value::Date(y)) if y.is_unset() => Value::Date(x.clone()),
        (Value::Date(x), Value::Date(y)) => Value::Date(x.min(y).clone()),
        _ => a.clone(),
    }
}

/// Like `max`, but the unset sentinel never wins.
pub fn date_max(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Date(x), Value::Date(y)) if x.is_unset() => Value::Date(y.clone()),
        (Value::Date(x), Value::Date(y)) if y.is_unset() => Value::Date(x.clone()),
        (Value::Date(x), Value::Date(y)) => Value::Date(x.max(y).clone()),
        _ => a.clone(),
    }
}
