use std::{
    io::Read,
    process::{Child, Command, Stdio},
    str::FromStr,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use derive_more::derive::{Deref, Display, Into};
use log::debug;
use thiserror::Error;

use crate::{error::JobInfoError, field::Schema, DEFAULT_TIMEOUT};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// `squeue` prints this when a job has no dependencies.
const NO_DEPENDENCY: &str = "(null)";
/// ... and this when it is not waiting for anything.
const NO_REASON: &str = "None";

/// A job id as accepted by `sacct -j`: digits, `_` (array jobs) and `.` (steps).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Into)]
pub struct JobId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job id `{0}`: only digits, `_` and `.` are allowed")]
pub struct InvalidJobId(String);

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '_' || c == '.') {
            Ok(JobId(s.to_owned()))
        } else {
            Err(InvalidJobId(s.to_owned()))
        }
    }
}

impl JobId {
    /// The step running the batch script, where `sstat` finds most of the usage.
    pub fn batch_step(&self) -> String {
        format!("{}.batch", self.0)
    }
}

/// The three commands a job report is assembled from. Each returns raw `|`/`;` separated
/// output, one row per line and no header.
pub trait Sources {
    /// `sacct`: one row per step, all of [`Schema::Full`].
    fn historical(&self, job: &JobId) -> Result<String, JobInfoError>;
    /// `sstat`: one row per running step, [`Schema::Live`] only.
    fn live(&self, job: &JobId) -> Result<String, JobInfoError>;
    /// `squeue`: a single `dependencies;reason` row.
    fn queue(&self, job: &JobId) -> Result<String, JobInfoError>;
}

/// What `squeue` adds for pending jobs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueState {
    pub dependencies: String,
    pub reason: String,
}

impl QueueState {
    /// First non-blank `dependencies;reason` line, `None` if there is none.
    pub fn parse(output: &str) -> Option<Self> {
        let line = output.lines().find(|line| !line.trim().is_empty())?;
        let (dependencies, reason) = line.split_once(';').unwrap_or((line, ""));
        let normalize = |token: &str, empty: &str| match token.trim() {
            token if token == empty => String::new(),
            token => token.to_owned(),
        };
        Some(QueueState {
            dependencies: normalize(dependencies, NO_DEPENDENCY),
            reason: normalize(reason, NO_REASON),
        })
    }
}

/// [`Sources`] backed by the Slurm command line tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurmCommands {
    pub sacct: String,
    pub sstat: String,
    pub squeue: String,
    /// Per invocation; the child is killed when it runs over.
    pub timeout: Duration,
}

impl Default for SlurmCommands {
    fn default() -> Self {
        SlurmCommands {
            sacct: "sacct".to_owned(),
            sstat: "sstat".to_owned(),
            squeue: "squeue".to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Sources for SlurmCommands {
    fn historical(&self, job: &JobId) -> Result<String, JobInfoError> {
        run(
            &self.sacct,
            &[
                "--noheader".to_owned(),
                "--parsable2".to_owned(), // sep by `|` without trailing `|`
                format!("--format={}", Schema::Full.format_arg()),
                "--jobs".to_owned(),
                job.to_string(),
            ],
            self.timeout,
        )
    }

    fn live(&self, job: &JobId) -> Result<String, JobInfoError> {
        run(
            &self.sstat,
            &[
                "--noheader".to_owned(),
                "--parsable2".to_owned(),
                format!("--format={}", Schema::Live.format_arg()),
                "--jobs".to_owned(),
                format!("{job},{}", job.batch_step()),
            ],
            self.timeout,
        )
    }

    fn queue(&self, job: &JobId) -> Result<String, JobInfoError> {
        run(
            &self.squeue,
            &[
                "--noheader".to_owned(),
                "--format=%E;%R".to_owned(),
                "--jobs".to_owned(),
                job.to_string(),
            ],
            self.timeout,
        )
    }
}

/// Runs `program` to completion and returns its stdout. Both pipes are drained on their own
/// threads while we poll for exit.
pub fn run(program: &str, args: &[String], timeout: Duration) -> Result<String, JobInfoError> {
    let unavailable = |reason: String| JobInfoError::SourceUnavailable {
        command: program.to_owned(),
        reason,
    };

    debug!("running `{program} {}`", args.join(" "));
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| unavailable(e.to_string()))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                reap(&mut child);
                return Err(JobInfoError::Timeout {
                    command: program.to_owned(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                reap(&mut child);
                return Err(unavailable(e.to_string()));
            }
        }
    };

    let collect = |handle: JoinHandle<Vec<u8>>| {
        handle
            .join()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|_| unavailable("reading output failed".to_owned()))
    };
    let stdout = collect(stdout)?;
    let stderr = collect(stderr)?;
    debug!("`{program}` exited with {status} after {:?}", started.elapsed());

    if !status.success() {
        return Err(unavailable(format!("{status}: {}", stderr.trim())));
    }
    Ok(stdout)
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
