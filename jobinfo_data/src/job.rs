use log::{debug, warn};

use crate::{
    error::JobInfoError,
    field::{Schema, USER_ID},
    record::{MergedRecord, PartialRecord},
    slurm::{JobId, QueueState, Sources},
    value::Value,
};

pub const RUNNING: &str = "RUNNING";
pub const PENDING: &str = "PENDING";

/// Who is asking. `sstat` only answers for root and the job's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub uid: u32,
}

impl Caller {
    pub fn is_privileged(&self) -> bool {
        self.uid == 0
    }

    pub fn owns(&self, record: &MergedRecord) -> bool {
        record.get(USER_ID).map(Value::as_count) == Some(u64::from(self.uid))
    }
}

/// Builds the report record for `job`.
///
/// # Steps:
/// + Merge all `sacct` rows, none at all means there is no such job
/// + Running and ours: merge the `sstat` rows on top
/// + Pending: attach dependencies and reason from `squeue`
///
/// Only `sacct` failures are fatal.
pub fn collect(job: &JobId, sources: &impl Sources, caller: Caller) -> Result<MergedRecord, JobInfoError> {
    let output = sources.historical(job)?;
    let rows = PartialRecord::decode_all(&output, Schema::Full)?;
    let mut record = MergedRecord::merge_all(rows).ok_or_else(|| JobInfoError::NoSuchJob(job.to_string()))?;

    if record.has_state(RUNNING) {
        if caller.is_privileged() || caller.owns(&record) {
            match sources.live(job) {
                Ok(output) => {
                    let rows = PartialRecord::decode_valid(&output, Schema::Live);
                    debug!("merging {} live rows", rows.len());
                    rows.iter().for_each(|row| record.absorb(row));
                }
                Err(e) => warn!("no live statistics for {job}: {e}"),
            }
        } else {
            debug!("uid {} neither root nor owner of {job}, skipping live statistics", caller.uid);
        }
    }

    if record.has_state(PENDING) {
        match sources.queue(job) {
            Ok(output) => {
                if let Some(QueueState { dependencies, reason }) = QueueState::parse(&output) {
                    record.dependencies = dependencies;
                    record.reason = reason;
                }
            }
            Err(e) => warn!("no queue state for {job}: {e}"),
        }
    }

    Ok(record)
}
