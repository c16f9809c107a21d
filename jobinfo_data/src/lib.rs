//! Collates what `sacct`, `sstat` and `squeue` know about one Slurm job into a single record.
//!
//! Every attribute is described once in [`field::FIELDS`]: its parser, how two observations
//! are merged and how the result is shown. The rest of the crate is generic over that table.
pub mod combine;
pub mod error;
pub mod field;
pub mod format;
pub mod job;
pub mod misc;
pub mod record;
pub mod report;
pub mod slurm;
pub mod value;

use std::time::Duration;

pub use error::JobInfoError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
