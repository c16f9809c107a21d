use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobInfoError {
    /// `sacct` knows nothing about the job.
    #[error("no such job: {0}")]
    NoSuchJob(String),
    /// The command could not be started or exited unsuccessfully.
    #[error("`{command}` unavailable: {reason}")]
    SourceUnavailable { command: String, reason: String },
    #[error("`{command}` did not finish within {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
    #[error("line {line}: expected {expected} `|` separated fields, got {got}")]
    MalformedRow { line: usize, expected: usize, got: usize },
}
