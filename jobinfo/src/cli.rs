use clap::Parser;
use jobinfo_data::slurm::JobId;

/// Collates accounting, live usage and queue state of a Slurm job into one report.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "jobinfo")]
pub struct Args {
    /// e.g. `1234`, `1234_7` (array task) or `1234.0` (step)
    pub job_id: JobId,
}
