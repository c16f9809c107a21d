use std::{
    ffi::OsString,
    io::{self, Write},
    process::ExitCode,
};

use chrono::Local;
use clap::{CommandFactory as _, Parser as _};
use color_eyre::{eyre::WrapErr as _, Result};
use jobinfo_data::{
    job::{self, Caller},
    report,
    slurm::Sources,
};
use log::{debug, info};

mod cli;
mod config;

use cli::Args;
use config::Settings;

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("jobinfo: {e:#}");
    }

    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return ExitCode::from(code),
    };

    let settings = match read_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("jobinfo: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logger(&settings.log_level);
    debug!("{settings:?}");

    let sources = settings.slurm_commands();
    match run(&args, &sources, current_caller(), &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jobinfo: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `--help` goes to stdout and exits 0, every other problem prints usage to stderr and exits 1.
fn parse_args<I, T>(argv: I) -> Result<Args, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(argv).map_err(|e| {
        if e.use_stderr() {
            eprint!("{}", usage_error(&e));
            1
        } else {
            let _ = e.print();
            0
        }
    })
}

/// clap only shows the usage line for missing or surplus arguments, not for a rejected job id.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    if rendered.contains("Usage:") {
        rendered
    } else {
        format!("{rendered}\n{}\n", Args::command().render_usage())
    }
}

fn init_logger(level: &str) {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .parse_filters(level)
        .parse_default_env()
        .init();
}

fn read_config() -> Result<Settings> {
    Settings::new().wrap_err("parsing config file")
}

fn current_caller() -> Caller {
    // SAFETY: geteuid has no preconditions and cannot fail
    let uid = unsafe { libc::geteuid() };
    Caller { uid }
}

fn run(args: &Args, sources: &impl Sources, caller: Caller, out: &mut impl Write) -> Result<()> {
    info!("collecting job {}", args.job_id);
    let record = job::collect(&args.job_id, sources, caller)?;
    report::write(&record, out).wrap_err("writing report")
}
