//! Console and JSON reporting of a run.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tscop_core::engine::step::Step;
use tscop_core::state::ObjectState;
use tscop_core::{Outcome, Schedule, Verdict};
use tscop_parser::Workload;

const RULE_WIDTH: usize = 50;

/// One line of `run --json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleReport {
    pub schedule: String,
    pub verdict: Verdict,
    /// Every processed operation, including the conflicting one.
    pub steps: Vec<Step>,
    /// Final read/write timestamps.
    pub objects: Vec<ObjectState>,
}

impl ScheduleReport {
    #[must_use]
    pub fn new(schedule: &Schedule, outcome: Outcome) -> Self {
        Self {
            schedule: schedule.id.clone(),
            verdict: outcome.verdict,
            steps: outcome.steps,
            objects: outcome.state.into_objects(),
        }
    }
}

/// Human-readable run trace.
pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn out_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Declared objects, transactions and their timestamps.
    ///
    /// # Errors
    ///
    /// Fails if the writer does.
    pub fn loaded(&mut self, workload: &Workload) -> io::Result<()> {
        let transactions: Vec<&str> = workload
            .transactions
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        let timestamps: Vec<String> = workload
            .transactions
            .iter()
            .map(|t| t.timestamp.to_string())
            .collect();

        writeln!(self.out, "=== LOADED CONFIGURATION ===")?;
        writeln!(self.out, "Objects: {}", workload.objects.join(", "))?;
        writeln!(self.out, "Transactions: {}", transactions.join(", "))?;
        writeln!(self.out, "Timestamps: {}", timestamps.join(", "))?;
        writeln!(self.out)?;
        writeln!(self.out, "Transaction -> timestamp:")?;
        for transaction in &workload.transactions {
            writeln!(self.out, "  {} -> {}", transaction.id, transaction.timestamp)?;
        }
        writeln!(self.out)
    }

    /// Per-operation trace of one schedule, plus its final table when it
    /// completed.
    ///
    /// # Errors
    ///
    /// Fails if the writer does.
    pub fn schedule(&mut self, schedule: &Schedule, outcome: &Outcome) -> io::Result<()> {
        writeln!(self.out, "=== PROCESSING {} ===", schedule.id)?;
        writeln!(self.out, "Schedule: {schedule}")?;
        for step in &outcome.steps {
            writeln!(self.out, "{step}")?;
        }
        if outcome.verdict.is_ok() {
            writeln!(self.out)?;
            writeln!(self.out, "--- Timestamp table for {} ---", schedule.id)?;
            write!(self.out, "{}", outcome.state)?;
            writeln!(self.out)?;
        }
        self.result(&outcome.verdict)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    /// # Errors
    ///
    /// Fails if the writer does.
    pub fn result(&mut self, verdict: &Verdict) -> io::Result<()> {
        writeln!(self.out, "RESULT: {verdict}")
    }

    /// Closing summary listing the files written.
    ///
    /// # Errors
    ///
    /// Fails if the writer does.
    pub fn completed(&mut self, output: &Path, logs: &[PathBuf]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== PROCESSING COMPLETE ===")?;
        writeln!(self.out, "Output file: {}", output.display())?;
        writeln!(self.out, "Object logs:")?;
        for log in logs {
            writeln!(self.out, "  - {}", log.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tscop_core::engine::sink::NoLog;
    use tscop_core::schedule::Action;
    use tscop_core::{Scheduler, TimestampTable};

    use super::*;

    fn rollback_outcome() -> (Schedule, Outcome) {
        let table = TimestampTable::from_declarations(
            vec!["t0".to_string(), "t1".to_string()],
            &[5, 3],
        )
        .unwrap();
        let objects = vec!["X".to_string()];
        let schedule = Schedule::from_actions(
            "E_2".to_string(),
            [
                Action::read("t0".to_string(), "X".to_string()),
                Action::write("t1".to_string(), "X".to_string()),
            ],
        );
        let outcome = Scheduler::new(&table, &objects)
            .run(&schedule, &mut NoLog)
            .unwrap();
        (schedule, outcome)
    }

    #[test]
    fn test_rollback_trace_has_no_table() {
        let (schedule, outcome) = rollback_outcome();
        let mut console = Console::new(Vec::new());
        console.schedule(&schedule, &outcome).unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();

        assert!(text.starts_with("=== PROCESSING E_2 ===\nSchedule: E_2-r0(X) w1(X)\n"));
        assert!(text.contains("moment 1: w1(X)"));
        assert!(text.contains("RESULT: E_2-ROLLBACK-1\n"));
        assert!(!text.contains("Timestamp table"));
    }

    #[test]
    fn test_report_json_shape() {
        let (schedule, outcome) = rollback_outcome();
        let report = ScheduleReport::new(&schedule, outcome);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["schedule"], "E_2");
        assert_eq!(value["verdict"]["result"], "rollback");
        assert_eq!(value["verdict"]["moment"], 1);
        assert_eq!(value["steps"].as_array().unwrap().len(), 2);
        assert_eq!(value["objects"][0]["read_ts"], 5);
        assert!(value["objects"][0]["write_ts"].is_null());

        let back: ScheduleReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_completed_lists_logs() {
        let mut console = Console::new(Vec::new());
        console
            .completed(
                Path::new("out.txt"),
                &[PathBuf::from("obj_logs/X.txt"), PathBuf::from("obj_logs/Y.txt")],
            )
            .unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.contains("Output file: out.txt\n"));
        assert!(text.ends_with("  - obj_logs/X.txt\n  - obj_logs/Y.txt\n"));
    }
}
