use derive_more::derive::Deref;
use itertools::Itertools as _;
use log::{debug, warn};

use crate::{
    error::JobInfoError,
    field::{self, Field, Schema, FIELDS},
    value::Value,
};

/// One row of source output, one value per entry of [`FIELDS`].
///
/// Rows of the live schema are widened on decode: the positions `sstat` does not report hold
/// the field's zero value.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct PartialRecord(Vec<Value>);

impl PartialRecord {
    /// Decodes one `|` separated row returned for `schema`.
    ///
    /// The last column takes whatever is left of the line, so it may itself contain `|`.
    pub fn decode(row: &str, schema: Schema) -> Result<Self, JobInfoError> {
        let expected = schema.len();
        let tokens = row.splitn(expected, '|').collect_vec();
        if tokens.len() != expected {
            return Err(JobInfoError::MalformedRow {
                line: 0,
                expected,
                got: tokens.len(),
            });
        }

        let mut values = FIELDS.iter().map(Field::zero).collect_vec();
        for ((pos, field), token) in schema.fields().zip(tokens) {
            values[pos] = (field.parse)(token);
        }
        Ok(Self(values))
    }

    /// Decodes every non-blank line of a command's output.
    pub fn decode_all(output: &str, schema: Schema) -> Result<Vec<Self>, JobInfoError> {
        let records: Vec<_> = Self::decode_lines(output, schema).collect::<Result<_, _>>()?;
        debug!("decoded {} {schema:?} rows", records.len());
        Ok(records)
    }

    /// Like [`Self::decode_all`], but malformed rows are logged and dropped.
    pub fn decode_valid(output: &str, schema: Schema) -> Vec<Self> {
        Self::decode_lines(output, schema)
            .filter_map(|row| match row {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping {schema:?} row: {e}");
                    None
                }
            })
            .collect()
    }

    fn decode_lines(output: &str, schema: Schema) -> impl Iterator<Item = Result<Self, JobInfoError>> + '_ {
        output
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(move |(i, line)| {
                Self::decode(line, schema).map_err(|e| match e {
                    JobInfoError::MalformedRow { expected, got, .. } => JobInfoError::MalformedRow {
                        line: i + 1,
                        expected,
                        got,
                    },
                    other => other,
                })
            })
    }
}

/// The fold of all partial records of one job, plus what only `squeue` knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    values: Vec<Value>,
    pub dependencies: String,
    pub reason: String,
}

impl MergedRecord {
    /// Seeds with `first` and folds in `rest` left to right.
    pub fn merge(first: PartialRecord, rest: impl IntoIterator<Item = PartialRecord>) -> Self {
        let mut merged = Self {
            values: first.0,
            dependencies: String::new(),
            reason: String::new(),
        };
        for record in rest {
            merged.absorb(&record);
        }
        merged
    }

    /// `None` for an empty sequence.
    pub fn merge_all(records: impl IntoIterator<Item = PartialRecord>) -> Option<Self> {
        let mut records = records.into_iter();
        let first = records.next()?;
        Some(Self::merge(first, records))
    }

    /// Replaces every value with `combine(current, record's value)`.
    pub fn absorb(&mut self, record: &PartialRecord) {
        for ((field, current), observed) in FIELDS.iter().zip(self.values.iter_mut()).zip(record.iter()) {
            *current = (field.combine)(current, observed);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        field::position(name).and_then(|pos| self.values.get(pos))
    }

    /// Comma separated `State` tokens, e.g. `["CANCELLED", "COMPLETED"]`.
    pub fn states(&self) -> Vec<&str> {
        self.get(field::STATE)
            .map(Value::as_text)
            .unwrap_or_default()
            .split(',')
            .filter(|state| !state.is_empty())
            .collect()
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states().contains(&state)
    }

    /// `(field, value)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Field, &Value)> {
        FIELDS.iter().zip(self.values.iter())
    }
}
