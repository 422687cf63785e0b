//! The `run` command: load an input file and process its schedules in order.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use derive_more::From;
use tscop_core::{engine, Scheduler, UnknownTransaction, Verdict};
use tscop_parser::{parse_workload, ConfigError, Unmatched, Workload};

use crate::logs::FileObjectLog;
use crate::report::{Console, ScheduleReport};
use crate::RunArgs;

/// How schedules are reported on the console.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Loaded configuration, per-operation trace and tables.
    #[default]
    Trace,
    /// Result lines only.
    Quiet,
    /// One JSON report per schedule.
    Json,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub unknown_transaction: UnknownTransaction,
    pub unmatched: Unmatched,
    pub mode: Mode,
}

impl From<&RunArgs> for RunConfig {
    fn from(args: &RunArgs) -> Self {
        let mode = if args.json {
            Mode::Json
        } else if args.quiet {
            Mode::Quiet
        } else {
            Mode::Trace
        };
        Self {
            unknown_transaction: args.unknown_transaction.into(),
            unmatched: args.unmatched.into(),
            mode,
        }
    }
}

/// A failure that stops the run.
#[derive(Debug, From)]
pub enum RunError {
    Input {
        path: PathBuf,
        source: io::Error,
    },
    #[from]
    Config(ConfigError),
    #[from]
    Engine(engine::Error<io::Error>),
    Output {
        path: PathBuf,
        source: io::Error,
    },
    #[from]
    Console(io::Error),
    #[from]
    Json(serde_json::Error),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Config(e) => write!(f, "invalid input: {e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Output { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            Self::Console(e) => write!(f, "failed to write to stdout: {e}"),
            Self::Json(e) => write!(f, "failed to encode report: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input { source, .. } | Self::Output { source, .. } | Self::Console(source) => {
                Some(source)
            }
            Self::Config(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

/// Processes the schedules of one workload, one after the other.
///
/// Owns nothing that outlives the run except through the borrowed object
/// log, which is shared by every schedule.
pub struct Runner<'a, W> {
    workload: &'a Workload,
    config: RunConfig,
    console: Console<W>,
}

impl<'a, W: Write> Runner<'a, W> {
    pub const fn new(workload: &'a Workload, config: RunConfig, out: W) -> Self {
        Self {
            workload,
            config,
            console: Console::new(out),
        }
    }

    /// Runs every schedule against a freshly reset state, recording accesses
    /// in `log`. Conflicts end a schedule, never the run.
    ///
    /// # Errors
    ///
    /// Fails on an unknown transaction under the reject policy, or when the
    /// log or console cannot be written.
    pub fn run(&mut self, log: &mut FileObjectLog) -> Result<Vec<Verdict>, RunError> {
        let scheduler = Scheduler::new(&self.workload.transactions, &self.workload.objects)
            .with_unknown_transaction(self.config.unknown_transaction);

        if self.config.mode == Mode::Trace {
            self.console.loaded(self.workload)?;
        }

        let mut verdicts = Vec::with_capacity(self.workload.schedules.len());
        for schedule in &self.workload.schedules {
            let outcome = scheduler.run(schedule, log)?;
            tracing::info!(verdict = %outcome.verdict, "schedule finished");
            let verdict = outcome.verdict.clone();
            match self.config.mode {
                Mode::Trace => self.console.schedule(schedule, &outcome)?,
                Mode::Quiet => self.console.result(&verdict)?,
                Mode::Json => {
                    let report = ScheduleReport::new(schedule, outcome);
                    let line = serde_json::to_string(&report)?;
                    writeln!(self.console.out_mut(), "{line}")?;
                }
            }
            verdicts.push(verdict);
        }
        Ok(verdicts)
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }
}

/// Reads `args.input`, runs it and writes the output and log files.
///
/// # Errors
///
/// Any [`RunError`]; nothing is written to the output file on failure.
pub fn run_files<W: Write>(args: &RunArgs, out: W) -> Result<Vec<Verdict>, RunError> {
    let config = RunConfig::from(args);
    let input = fs::read_to_string(&args.input).map_err(|source| RunError::Input {
        path: args.input.clone(),
        source,
    })?;
    let workload = parse_workload(&input, config.unmatched)?;
    tracing::debug!(
        objects = workload.objects.len(),
        transactions = workload.transactions.len(),
        schedules = workload.schedules.len(),
        "input loaded"
    );

    let log_error = |source| RunError::Output {
        path: args.log_dir.clone(),
        source,
    };
    let mut log = FileObjectLog::create(&args.log_dir, &workload.objects).map_err(log_error)?;

    let mut runner = Runner::new(&workload, config, out);
    let verdicts = runner.run(&mut log)?;
    let logs = log.finish().map_err(log_error)?;

    let mut output = String::new();
    for verdict in &verdicts {
        output.push_str(&verdict.to_string());
        output.push('\n');
    }
    fs::write(&args.output, output).map_err(|source| RunError::Output {
        path: args.output.clone(),
        source,
    })?;

    if config.mode == Mode::Trace {
        runner.into_console().completed(&args.output, &logs)?;
    }
    Ok(verdicts)
}
