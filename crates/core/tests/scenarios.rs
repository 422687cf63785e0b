mod common;

use common::{objects, table};
use tscop_core::engine::sink::{MemoryLog, NoLog};
use tscop_core::engine::step::Check;
use tscop_core::{Scheduler, Verdict};

#[test]
fn single_write_is_accepted() {
    let table = table(&[("t0", 5)]);
    let objects = objects(&["X"]);
    let outcome = Scheduler::new(&table, &objects)
        .run(&schedule!("E_1": w(0, X)), &mut NoLog)
        .unwrap();
    assert_eq!(outcome.verdict.to_string(), "E_1-OK");
    assert_eq!(outcome.state.write_ts("X"), Some(5));
}

#[test]
fn older_write_after_younger_read_rolls_back() {
    let table = table(&[("t0", 5), ("t1", 3)]);
    let objects = objects(&["X"]);
    let outcome = Scheduler::new(&table, &objects)
        .run(&schedule!("E_2": r(0, X), w(1, X)), &mut NoLog)
        .unwrap();
    assert_eq!(
        outcome.verdict,
        Verdict::Rollback {
            schedule: "E_2".to_string(),
            moment: 1
        }
    );
    assert_eq!(outcome.state.read_ts("X"), Some(5));
}

#[test]
fn commit_is_observed_only() {
    let table = table(&[("t0", 10)]);
    let objects = objects(&["X"]);
    let outcome = Scheduler::new(&table, &objects)
        .run(&schedule!("E_3": w(0, X), c(0)), &mut NoLog)
        .unwrap();
    assert!(outcome.verdict.is_ok());
    assert_eq!(outcome.state.write_ts("X"), Some(10));
    assert_eq!(outcome.state.read_ts("X"), None);
}

#[test]
fn classic_interleaving() {
    let table = table(&[("t1", 1), ("t2", 2), ("t3", 3)]);
    let objects = objects(&["X", "Y"]);
    let scheduler = Scheduler::new(&table, &objects);

    let ok = scheduler
        .run(
            &schedule!("E_1": r(1, X), r(2, X), w(2, Y), r(3, Y), w(3, X), c(1), c(2), c(3)),
            &mut NoLog,
        )
        .unwrap();
    assert!(ok.verdict.is_ok());
    assert_eq!(ok.state.read_ts("X"), Some(2));
    assert_eq!(ok.state.write_ts("X"), Some(3));
    assert_eq!(ok.state.read_ts("Y"), Some(3));
    assert_eq!(ok.state.write_ts("Y"), Some(2));

    let rollback = scheduler
        .run(
            &schedule!("E_2": r(3, X), w(3, X), r(2, Y), w(2, X), c(2)),
            &mut NoLog,
        )
        .unwrap();
    assert_eq!(rollback.verdict.to_string(), "E_2-ROLLBACK-3");
}

#[test]
fn every_access_is_logged_before_the_check() {
    let table = table(&[("t1", 1), ("t2", 2)]);
    let objects = objects(&["X", "Y"]);
    let mut log = MemoryLog::default();
    let outcome = Scheduler::new(&table, &objects)
        .run(
            &schedule!("E_1": w(1, Y), c(1), w(2, X), r(1, X), w(2, Y)),
            &mut log,
        )
        .unwrap();
    assert_eq!(outcome.verdict.conflict_moment(), Some(3));
    let x: Vec<&str> = log.lines("X").collect();
    let y: Vec<&str> = log.lines("Y").collect();
    assert_eq!(x, ["E_1, Write, 2", "E_1, Read, 3"]);
    assert_eq!(y, ["E_1, Write, 0"]);
}

#[test]
fn rerun_is_idempotent() {
    let table = table(&[("t1", 4), ("t2", 2), ("t3", 9)]);
    let objects = objects(&["X", "Y"]);
    let scheduler = Scheduler::new(&table, &objects);
    let schedule = schedule!("E_1": r(1, X), w(3, Y), r(2, Y), c(1));

    let first = scheduler.run(&schedule, &mut NoLog).unwrap();
    let second = scheduler.run(&schedule, &mut NoLog).unwrap();
    assert_eq!(first, second);
}

#[test]
fn read_ts_is_monotonic_over_accepted_reads() {
    let table = table(&[("t1", 6), ("t2", 1), ("t3", 8), ("t4", 3)]);
    let objects = objects(&["X"]);
    let outcome = Scheduler::new(&table, &objects)
        .run(
            &schedule!("E_1": r(1, X), r(2, X), r(3, X), r(4, X)),
            &mut NoLog,
        )
        .unwrap();
    assert!(outcome.verdict.is_ok());

    let mut previous: Option<i64> = None;
    for step in &outcome.steps {
        let Check::Read {
            timestamp, read_ts, ..
        } = step.check
        else {
            panic!("only reads in this schedule");
        };
        assert_eq!(read_ts, previous);
        previous = Some(previous.map_or(timestamp, |p| p.max(timestamp)));
    }
    assert_eq!(outcome.state.read_ts("X"), Some(8));
}

#[test]
fn accepted_writes_satisfy_precondition() {
    let table = table(&[("t1", 1), ("t2", 2), ("t3", 3), ("t4", 4)]);
    let objects = objects(&["X"]);
    let scheduler = Scheduler::new(&table, &objects);
    let schedules = [
        schedule!("E_1": r(3, X), w(2, X)),
        schedule!("E_2": w(4, X), w(1, X)),
        schedule!("E_3": r(2, X), w(2, X), w(3, X), r(4, X), w(4, X)),
        schedule!("E_4": w(1, X), r(1, X), w(2, X), r(3, X), w(2, X)),
    ];

    let mut verdicts = Vec::new();
    for schedule in &schedules {
        let outcome = scheduler.run(schedule, &mut NoLog).unwrap();
        for step in &outcome.steps {
            if let Check::Write {
                timestamp,
                read_ts,
                write_ts,
                accepted,
            } = step.check
            {
                let younger = |ts: Option<i64>| ts.is_some_and(|ts| ts > timestamp);
                assert_eq!(accepted, !younger(read_ts) && !younger(write_ts));
            }
        }
        verdicts.push(outcome.verdict.to_string());
    }
    assert_eq!(
        verdicts,
        ["E_1-ROLLBACK-1", "E_2-ROLLBACK-1", "E_3-OK", "E_4-ROLLBACK-4"]
    );
}

#[test]
fn final_table_lists_declared_objects() {
    let table = table(&[("t1", 2)]);
    let objects = objects(&["X", "Y", "Z"]);
    let outcome = Scheduler::new(&table, &objects)
        .run(&schedule!("E_1": r(1, Y), w(1, Z)), &mut NoLog)
        .unwrap();
    let expected = "\
Object    TS-Read     TS-Write
----------------------------------
X         NULL        NULL
Y         2           NULL
Z         NULL        2
";
    assert_eq!(outcome.state.to_string(), expected);
}
