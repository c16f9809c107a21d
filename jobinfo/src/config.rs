use std::{env, path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use jobinfo_data::{slurm::SlurmCommands, DEFAULT_TIMEOUT};
use serde::Deserialize;

const SYSTEM_CONFIG: &str = "/etc/jobinfo/config";
const CONFIG_ENV: &str = "JOBINFO_CONFIG";
const ENV_PREFIX: &str = "JOBINFO";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub sacct: String,
    pub sstat: String,
    pub squeue: String,
    pub query_timeout_secs: u64,
    /// `env_logger` filter, `RUST_LOG` still wins
    pub log_level: String,
}

impl Settings {
    /// Defaults, then `/etc/jobinfo/config.*`, then `$JOBINFO_CONFIG`, then `JOBINFO_*` variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    pub fn load(extra_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let defaults = SlurmCommands::default();
        let mut builder = Config::builder()
            .set_default("sacct", defaults.sacct)?
            .set_default("sstat", defaults.sstat)?
            .set_default("squeue", defaults.squeue)?
            .set_default("query_timeout_secs", DEFAULT_TIMEOUT.as_secs().to_string())?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .add_source(File::with_name(SYSTEM_CONFIG).required(false));
        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn slurm_commands(&self) -> SlurmCommands {
        SlurmCommands {
            sacct: self.sacct.clone(),
            sstat: self.sstat.clone(),
            squeue: self.squeue.clone(),
            timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }
}
