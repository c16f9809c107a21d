use itertools::Itertools as _;

use crate::{
    combine::{self, Combine},
    format::{self, Format},
    misc::parsing::{ByteSize, Timestamp},
    value::{TimeSpan, Value},
};

pub type Parse = fn(&str) -> Value;

/// How one job attribute is queried, parsed, merged and shown.
#[derive(Clone, Copy)]
pub struct Field {
    /// Also the `--format` key understood by `sacct`/`sstat`.
    pub name: &'static str,
    pub parse: Parse,
    pub combine: Combine,
    pub visible: bool,
    /// Only `sstat` has a meaningful value while the job runs.
    pub prefer_live: bool,
    pub format: Format,
    pub label: &'static str,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("prefer_live", &self.prefer_live)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Field {
    const fn new(name: &'static str, parse: Parse, combine: Combine, label: &'static str, format: Format) -> Self {
        Field {
            name,
            parse,
            combine,
            visible: true,
            prefer_live: false,
            format,
            label,
        }
    }

    const fn hidden(name: &'static str, parse: Parse, combine: Combine) -> Self {
        Field {
            visible: false,
            ..Field::new(name, parse, combine, "", format::plain)
        }
    }

    const fn live(self) -> Self {
        Field {
            prefer_live: true,
            ..self
        }
    }

    /// What the parser yields for an absent token.
    pub fn zero(&self) -> Value {
        (self.parse)("")
    }
}

fn text(input: &str) -> Value {
    Value::Text(input.trim().to_owned())
}

fn count(input: &str) -> Value {
    Value::Count(input.trim().parse().unwrap_or(0))
}

fn bytes(input: &str) -> Value {
    Value::Bytes(ByteSize::parse(input))
}

fn time(input: &str) -> Value {
    Value::Time(TimeSpan::parse(input))
}

fn date(input: &str) -> Value {
    Value::Date(Timestamp::parse(input))
}

pub const USER_ID: &str = "UID";
pub const STATE: &str = "State";
pub const TIME_LIMIT: &str = "Timelimit";
pub const ELAPSED: &str = "Elapsed";
pub const TOTAL_CPU: &str = "TotalCPU";
pub const MAX_RSS_NODE: &str = "MaxRSSNode";
pub const MAX_DISK_WRITE_NODE: &str = "MaxDiskWriteNode";
pub const MAX_DISK_READ_NODE: &str = "MaxDiskReadNode";

/// Every field in query and report order. `Comment` stays last so a `|` inside it cannot shift
/// the other columns.
#[rustfmt::skip]
pub static FIELDS: [Field; 24] = [
    Field::new("JobName",      text,  combine::keep_first, "Name",                 format::plain),
    Field::new("User",         text,  combine::keep_first, "User",                 format::plain),
    Field::hidden(USER_ID,     count, combine::max),
    Field::new("Partition",    text,  combine::keep_first, "Partition",            format::plain),
    Field::new("NodeList",     text,  combine::keep_first, "Nodes",                format::plain),
    Field::new("NCPUS",        count, combine::max,        "Cores",                format::plain),
    Field::new("NTasks",       count, combine::max,        "Tasks",                format::plain),
    Field::new(STATE,          text,  combine::append,     "State",                format::state),
    Field::new("Submit",       date,  combine::date_min,   "Submit",               format::date),
    Field::new("Start",        date,  combine::date_min,   "Start",                format::date),
    Field::new("End",          date,  combine::date_max,   "End",                  format::date),
    Field::new(TIME_LIMIT,     time,  combine::time_max,   "Reserved walltime",    format::time),
    Field::new(ELAPSED,        time,  combine::time_max,   "Used walltime",        format::time),
    Field::new(TOTAL_CPU,      time,  combine::time_max,   "Used CPU time",        format::time),
    Field::new("UserCPU",      time,  combine::time_max,   "% User (Computation)", format::cpu_share),
    Field::new("SystemCPU",    time,  combine::time_max,   "% System (I/O)",       format::cpu_share),
    Field::new("ReqMem",       text,  combine::keep_first, "Mem reserved",         format::mem_request),
    Field::new("MaxRSS",       bytes, combine::max,        "Max Mem used",         format::max_rss).live(),
    Field::hidden(MAX_RSS_NODE, text, combine::append).live(),
    Field::new("MaxDiskWrite", bytes, combine::max,        "Max Disk Write",       format::max_disk_write).live(),
    Field::hidden(MAX_DISK_WRITE_NODE, text, combine::append).live(),
    Field::new("MaxDiskRead",  bytes, combine::max,        "Max Disk Read",        format::max_disk_read).live(),
    Field::hidden(MAX_DISK_READ_NODE, text, combine::append).live(),
    Field::new("Comment",      text,  combine::keep_first, "Comment",              format::plain),
];

/// Position of a field in [`FIELDS`].
pub fn position(name: &str) -> Option<usize> {
    FIELDS.iter().position(|field| field.name == name)
}

/// Which columns a source returns. Both variants are views onto [`FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// `sacct`: every field
    Full,
    /// `sstat`: only the `prefer_live` fields, in table order
    Live,
}

impl Schema {
    /// `(position in FIELDS, field)` for every column of this schema.
    pub fn fields(self) -> impl Iterator<Item = (usize, &'static Field)> {
        FIELDS
            .iter()
            .enumerate()
            .filter(move |(_, field)| self == Schema::Full || field.prefer_live)
    }

    pub fn len(self) -> usize {
        self.fields().count()
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Comma joined field names for `--format=`.
    pub fn format_arg(self) -> String {
        self.fields().map(|(_, field)| field.name).join(",")
    }
}
