use std::cell::RefCell;

use color_eyre::{eyre::eyre, Result};
use itertools::Itertools as _;
use jobinfo_data::{
    field::FIELDS,
    job::{self, Caller},
    report,
    slurm::{JobId, Sources},
    JobInfoError,
};

const OWNER: Caller = Caller { uid: 1000 };
const STRANGER: Caller = Caller { uid: 2000 };
const ROOT: Caller = Caller { uid: 0 };

/// Canned command output, remembering which commands were asked.
#[derive(Default)]
struct FakeSources {
    historical: Option<String>,
    live: Option<String>,
    queue: Option<String>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeSources {
    fn answer(&self, name: &'static str, output: &Option<String>) -> Result<String, JobInfoError> {
        self.calls.borrow_mut().push(name);
        output.clone().ok_or_else(|| JobInfoError::SourceUnavailable {
            command: name.to_owned(),
            reason: "exit status: 1".to_owned(),
        })
    }
}

impl Sources for FakeSources {
    fn historical(&self, _: &JobId) -> Result<String, JobInfoError> {
        self.answer("sacct", &self.historical)
    }

    fn live(&self, _: &JobId) -> Result<String, JobInfoError> {
        self.answer("sstat", &self.live)
    }

    fn queue(&self, _: &JobId) -> Result<String, JobInfoError> {
        self.answer("squeue", &self.queue)
    }
}

/// A full-width `sacct` row, fields not named are empty.
fn sacct_row(overrides: &[(&str, &str)]) -> String {
    FIELDS
        .iter()
        .map(|field| {
            overrides
                .iter()
                .find(|(name, _)| *name == field.name)
                .map_or("", |(_, token)| *token)
        })
        .join("|")
}

fn job() -> Result<JobId> {
    Ok("4242".parse()?)
}

fn render(sources: &FakeSources, caller: Caller) -> Result<String> {
    let record = job::collect(&job()?, sources, caller)?;
    let mut out = Vec::new();
    report::write(&record, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn line<'a>(report: &'a str, label: &str) -> Result<&'a str> {
    report
        .lines()
        .find_map(|line| {
            let (lhs, rhs) = line.split_once(" : ")?;
            (lhs.trim_end() == label).then_some(rhs)
        })
        .ok_or_else(|| eyre!("no `{label}` line in\n{report}"))
}

fn running_job() -> String {
    [
        sacct_row(&[
            ("JobName", "train"),
            ("User", "alice"),
            ("UID", "1000"),
            ("State", "RUNNING"),
            ("NCPUS", "4"),
            ("Timelimit", "1-00:00:00"),
            ("Elapsed", "02:00:00"),
            ("TotalCPU", "00:00:00"),
            ("ReqMem", "4000Mc"),
            ("Start", "2024-03-01T12:00:00"),
            ("End", "Unknown"),
        ]),
        sacct_row(&[("State", "RUNNING"), ("UID", "1000"), ("NCPUS", "4")]),
    ]
    .join("\n")
}

#[test_log::test]
fn running_job_includes_live_memory() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: Some("1536M|node03|10K|node03|0|node03\n0|node01|0|node01|0|node01\n".to_owned()),
        ..Default::default()
    };
    let report = render(&sources, OWNER)?;

    assert_eq!(line(&report, "Max Mem used")?, "1.50G (node01,node03)");
    assert_eq!(line(&report, "Max Disk Write")?, "10.00K (node01,node03)");
    assert_eq!(line(&report, "Name")?, "train");
    assert_eq!(line(&report, "State")?, "RUNNING");
    assert_eq!(line(&report, "Mem reserved")?, "4000M/core");
    assert_eq!(line(&report, "Reserved walltime")?, "1-00:00:00");
    assert_eq!(line(&report, "Used walltime")?, "  02:00:00");
    assert_eq!(line(&report, "Used CPU time")?, "--");
    assert_eq!(line(&report, "% User (Computation)")?, "--");
    assert_eq!(line(&report, "Start")?, "2024-03-01 12:00:00");
    assert_eq!(line(&report, "End")?, "--");
    assert_eq!(*sources.calls.borrow(), ["sacct", "sstat"]);
    Ok(())
}

#[test]
fn running_job_single_live_node() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: Some("2G|node03|0|node03|0|node03".to_owned()),
        ..Default::default()
    };
    let report = render(&sources, ROOT)?;
    assert_eq!(line(&report, "Max Mem used")?, "2.00G (node03)");
    Ok(())
}

#[test]
fn running_job_of_someone_else_skips_live() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: Some("2G|node03|0|node03|0|node03".to_owned()),
        ..Default::default()
    };
    let report = render(&sources, STRANGER)?;
    assert_eq!(line(&report, "Max Mem used")?, "0.00 ");
    assert_eq!(*sources.calls.borrow(), ["sacct"]);
    Ok(())
}

#[test_log::test]
fn live_failure_is_not_fatal() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: None,
        ..Default::default()
    };
    let report = render(&sources, OWNER)?;
    assert_eq!(line(&report, "Name")?, "train");
    Ok(())
}

#[test_log::test]
fn malformed_live_row_keeps_the_others() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: Some("1536M|node03|0|node03|0|node03\n2G|node01\n".to_owned()),
        ..Default::default()
    };
    let report = render(&sources, OWNER)?;
    assert_eq!(line(&report, "Max Mem used")?, "1.50G (node03)");
    Ok(())
}

#[test]
fn empty_live_output_is_not_an_error() -> Result<()> {
    let sources = FakeSources {
        historical: Some(running_job()),
        live: Some(String::new()),
        ..Default::default()
    };
    render(&sources, OWNER)?;
    Ok(())
}

#[test]
fn cancelled_step_supersedes_completed() -> Result<()> {
    let sources = FakeSources {
        historical: Some(
            [
                sacct_row(&[("JobName", "sim"), ("State", "COMPLETED"), ("MaxRSS", "100M"), ("MaxRSSNode", "n1")]),
                sacct_row(&[("State", "CANCELLED"), ("MaxRSS", "3G"), ("MaxRSSNode", "n2")]),
            ]
            .join("\n"),
        ),
        ..Default::default()
    };
    let report = render(&sources, OWNER)?;
    assert_eq!(line(&report, "State")?, "CANCELLED");
    assert_eq!(line(&report, "Max Mem used")?, "3.00G (n1,n2)");
    assert_eq!(*sources.calls.borrow(), ["sacct"]);
    Ok(())
}

#[test]
fn pending_job_shows_reason_and_dependencies() -> Result<()> {
    let sources = FakeSources {
        historical: Some(sacct_row(&[("JobName", "post"), ("State", "PENDING"), ("Start", "Unknown")])),
        queue: Some("afterok:4241(unfulfilled);Dependency\n".to_owned()),
        ..Default::default()
    };
    let report = render(&sources, STRANGER)?;
    assert_eq!(line(&report, "State")?, "PENDING (Dependency), depends on afterok:4241(unfulfilled)");
    assert_eq!(line(&report, "Start")?, "--");
    assert_eq!(*sources.calls.borrow(), ["sacct", "squeue"]);
    Ok(())
}

#[test]
fn pending_job_without_queue_data() -> Result<()> {
    let sources = FakeSources {
        historical: Some(sacct_row(&[("State", "PENDING")])),
        queue: None,
        ..Default::default()
    };
    let report = render(&sources, OWNER)?;
    assert_eq!(line(&report, "State")?, "PENDING");
    Ok(())
}

#[test]
fn no_rows_is_no_such_job() -> Result<()> {
    let sources = FakeSources {
        historical: Some("\n".to_owned()),
        ..Default::default()
    };
    let result = job::collect(&job()?, &sources, OWNER);
    assert!(matches!(result, Err(JobInfoError::NoSuchJob(id)) if id == "4242"));
    Ok(())
}

#[test]
fn sacct_failure_is_not_no_such_job() -> Result<()> {
    let sources = FakeSources::default();
    let result = job::collect(&job()?, &sources, OWNER);
    assert!(matches!(result, Err(JobInfoError::SourceUnavailable { .. })));
    Ok(())
}
