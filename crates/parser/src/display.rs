use std::fmt::Write;

use crate::parser::{parse_schedule_line, Unmatched};

/// Rewrite every schedule line of an input file in canonical form,
/// `E_1-r1(X) w2(X) c1`. Other lines are kept as they are.
///
/// Unmatched schedule text is dropped. The output always ends with a
/// newline.
#[must_use]
pub fn format_input(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for line in input.lines() {
        if line.starts_with("E_") {
            if let Ok(schedule) = parse_schedule_line(line, Unmatched::Skip) {
                let _ = writeln!(output, "{schedule}");
                continue;
            }
        }
        let _ = writeln!(output, "{line}");
    }
    output
}
