//! tscop CLI -- simulate basic timestamp-ordering schedulers.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod logs;
pub mod report;
pub mod run;

#[derive(Debug, Parser)]
#[command(
    name = "tscop",
    about = "Basic timestamp-ordering scheduler simulation"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every schedule of an input file through the scheduler
    Run(RunArgs),
    /// Generate random input files
    Generate(GenerateArgs),
    /// Rewrite schedule lines of input files in canonical form
    Fmt(FmtArgs),
    /// Print the JSON Schema of the `run --json` report to stdout
    Schema,
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Input file with declarations and schedule lines
    #[arg(default_value = "in.txt")]
    pub input: PathBuf,
    /// File receiving one result line per schedule
    #[arg(long, default_value = "out.txt")]
    pub output: PathBuf,
    /// Directory receiving one log file per declared object
    #[arg(long, default_value = "obj_logs")]
    pub log_dir: PathBuf,
    /// Timestamp used for transactions missing from the declarations
    #[arg(long, value_enum, default_value_t = UnknownTransactionArg::Zero)]
    pub unknown_transaction: UnknownTransactionArg,
    /// Schedule text that is not an operation
    #[arg(long, value_enum, default_value_t = UnmatchedArg::Skip)]
    pub unmatched: UnmatchedArg,
    /// Output one JSON report per schedule instead of the console trace
    #[arg(long)]
    pub json: bool,
    /// Only print result lines
    #[arg(long, conflicts_with = "json")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownTransactionArg {
    /// Treat the transaction as having timestamp 0
    Zero,
    /// Abort the run
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnmatchedArg {
    /// Ignore it
    Skip,
    /// Abort loading the input
    Reject,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of input files to generate
    #[arg(long)]
    pub n_workload: u64,
    /// Number of declared objects
    #[arg(long)]
    pub n_object: u64,
    /// Number of declared transactions
    #[arg(long)]
    pub n_transaction: u64,
    /// Number of schedules per file
    #[arg(long)]
    pub n_schedule: u64,
    /// Maximum number of operations per schedule
    #[arg(long)]
    pub n_operation: u64,
    /// Largest timestamp to assign
    #[arg(long, default_value_t = 100)]
    pub max_timestamp: i64,
    /// Output directory for generated input files
    #[arg(long)]
    pub output_dir: PathBuf,
}

#[derive(Debug, Parser)]
pub struct FmtArgs {
    /// Input files, or directories of `.txt` input files
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Check formatting without modifying files (exit 1 if unformatted)
    #[arg(long)]
    pub check: bool,
}

impl From<UnknownTransactionArg> for tscop_core::UnknownTransaction {
    fn from(arg: UnknownTransactionArg) -> Self {
        match arg {
            UnknownTransactionArg::Zero => Self::Zero,
            UnknownTransactionArg::Reject => Self::Reject,
        }
    }
}

impl From<UnmatchedArg> for tscop_parser::Unmatched {
    fn from(arg: UnmatchedArg) -> Self {
        match arg {
            UnmatchedArg::Skip => Self::Skip,
            UnmatchedArg::Reject => Self::Reject,
        }
    }
}

impl From<&GenerateArgs> for tscop_testgen::generator::WorkloadParams {
    fn from(args: &GenerateArgs) -> Self {
        Self::builder()
            .n_object(args.n_object)
            .n_transaction(args.n_transaction)
            .n_schedule(args.n_schedule)
            .n_operation(args.n_operation)
            .max_timestamp(args.max_timestamp)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let app = App::parse_from(["tscop", "run"]);
        let Command::Run(args) = app.command else {
            panic!("expected run");
        };
        assert_eq!(args.input, PathBuf::from("in.txt"));
        assert_eq!(args.output, PathBuf::from("out.txt"));
        assert_eq!(args.log_dir, PathBuf::from("obj_logs"));
        assert_eq!(args.unknown_transaction, UnknownTransactionArg::Zero);
        assert_eq!(args.unmatched, UnmatchedArg::Skip);
        assert!(!args.json && !args.quiet);
    }

    #[test]
    fn test_run_policies() {
        let app = App::parse_from([
            "tscop",
            "run",
            "sched.txt",
            "--unknown-transaction",
            "reject",
            "--unmatched",
            "reject",
        ]);
        let Command::Run(args) = app.command else {
            panic!("expected run");
        };
        assert_eq!(args.input, PathBuf::from("sched.txt"));
        assert_eq!(
            tscop_core::UnknownTransaction::from(args.unknown_transaction),
            tscop_core::UnknownTransaction::Reject
        );
        assert_eq!(
            tscop_parser::Unmatched::from(args.unmatched),
            tscop_parser::Unmatched::Reject
        );
    }

    #[test]
    fn test_json_conflicts_with_quiet() {
        assert!(App::try_parse_from(["tscop", "run", "--json", "--quiet"]).is_err());
    }
}
