//! Input-file and schedule-text parsing for `tscop`.

pub mod display;
pub mod lexer;
pub mod parser;

pub use display::format_input;
pub use lexer::{tokenize, Token, TokenKind, Tokens};
pub use parser::{
    parse_schedule_line, parse_workload, ConfigError, ScheduleError, Section, Unmatched, Workload,
};
