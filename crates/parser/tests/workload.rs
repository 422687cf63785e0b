use tscop_core::engine::sink::MemoryLog;
use tscop_core::{Scheduler, Verdict};
use tscop_parser::{parse_workload, Unmatched, Workload};

fn verdicts(workload: &Workload, log: &mut MemoryLog) -> Vec<String> {
    let scheduler = Scheduler::new(&workload.transactions, &workload.objects);
    workload
        .schedules
        .iter()
        .map(|schedule| {
            scheduler
                .run(schedule, &mut *log)
                .expect("memory log never fails")
                .verdict
                .to_string()
        })
        .collect()
}

#[test]
fn spec_scenarios_end_to_end() {
    let input = "\
X;
t0, t1;
5, 3;
E_1-w0(X)
E_2-r0(X) w1(X)
E_3-w0(X) c0
";
    let workload = parse_workload(input, Unmatched::Skip).expect("should parse");
    let mut log = MemoryLog::default();
    assert_eq!(
        verdicts(&workload, &mut log),
        ["E_1-OK", "E_2-ROLLBACK-1", "E_3-OK"]
    );
    let x: Vec<&str> = log.lines("X").collect();
    assert_eq!(
        x,
        [
            "E_1, Write, 0",
            "E_2, Read, 0",
            "E_2, Write, 1",
            "E_3, Write, 0"
        ]
    );
}

#[test]
fn garbage_schedule_is_ok_with_nothing_logged() {
    let input = "X;\nt0;\n1;\nE_1-xyz\n";
    let workload = parse_workload(input, Unmatched::Skip).expect("should parse");
    assert!(workload.schedules[0].is_empty());
    let mut log = MemoryLog::default();
    assert_eq!(verdicts(&workload, &mut log), ["E_1-OK"]);
    assert!(log.is_empty());

    // The same text is refused when unmatched text is an error.
    assert!(parse_workload(input, Unmatched::Reject).is_err());
}

#[test]
fn schedules_do_not_share_timestamps() {
    let input = "\
X, Y;
t1, t2;
1, 2;
E_1-w2(X) w2(Y) c2
E_2-r1(X) w1(Y) c1
";
    let workload = parse_workload(input, Unmatched::Skip).expect("should parse");
    let mut log = MemoryLog::default();
    assert_eq!(verdicts(&workload, &mut log), ["E_1-OK", "E_2-OK"]);
}

#[test]
fn verdict_lines_parse_back() {
    let input = "X;\nt1, t2;\n2, 1;\nE_1-r1(X) w2(X)\nE_2-r2(X) w1(X) c1\n";
    let workload = parse_workload(input, Unmatched::Skip).expect("should parse");
    let mut log = MemoryLog::default();
    let lines = verdicts(&workload, &mut log);
    let parsed: Vec<Verdict> = lines.iter().map(|l| l.parse().unwrap()).collect();
    assert_eq!(parsed[0].conflict_moment(), Some(1));
    assert!(parsed[1].is_ok());
}
