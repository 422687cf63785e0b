//! Receivers for object accesses.
//!
//! The engine reports every read and write to an [`ObjectLogSink`] before it
//! checks the access, so conflicting operations are logged too.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt::{Display, Formatter, Result};

use crate::schedule::{Access, Moment};

/// One object access as seen by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry<'a> {
    pub schedule: &'a str,
    pub object: &'a str,
    pub access: Access,
    pub moment: Moment,
}

/// Object-log line: `E_1, Read, 0`.
impl Display for LogEntry<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}, {}, {}", self.schedule, self.access, self.moment)
    }
}

/// Receives object accesses while a schedule is processed.
pub trait ObjectLogSink {
    type Error;

    /// Records one access.
    ///
    /// # Errors
    ///
    /// Implementations backed by I/O return their write errors; the engine
    /// stops and propagates them.
    fn record(&mut self, entry: &LogEntry<'_>) -> core::result::Result<(), Self::Error>;
}

impl<S: ObjectLogSink + ?Sized> ObjectLogSink for &mut S {
    type Error = S::Error;

    fn record(&mut self, entry: &LogEntry<'_>) -> core::result::Result<(), Self::Error> {
        (**self).record(entry)
    }
}

/// Discards every access.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLog;

impl ObjectLogSink for NoLog {
    type Error = Infallible;

    fn record(&mut self, _entry: &LogEntry<'_>) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Keeps rendered log lines in memory, tagged with their object.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryLog {
    pub entries: Vec<(String, String)>,
}

impl MemoryLog {
    /// Log lines written for `object`, in order.
    pub fn lines<'a>(&'a self, object: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(o, _)| o == object)
            .map(|(_, line)| line.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ObjectLogSink for MemoryLog {
    type Error = Infallible;

    fn record(&mut self, entry: &LogEntry<'_>) -> core::result::Result<(), Self::Error> {
        self.entries
            .push((entry.object.to_string(), entry.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_line() {
        let entry = LogEntry {
            schedule: "E_2",
            object: "X",
            access: Access::Write,
            moment: 4,
        };
        assert_eq!(entry.to_string(), "E_2, Write, 4");
    }

    #[test]
    fn test_memory_log_groups_by_object() {
        let mut log = MemoryLog::default();
        for (object, access, moment) in [
            ("X", Access::Read, 0),
            ("Y", Access::Write, 1),
            ("X", Access::Write, 2),
        ] {
            log.record(&LogEntry {
                schedule: "E_1",
                object,
                access,
                moment,
            })
            .unwrap();
        }
        assert_eq!(log.len(), 3);
        let x: Vec<&str> = log.lines("X").collect();
        assert_eq!(x, ["E_1, Read, 0", "E_1, Write, 2"]);
        assert_eq!(log.lines("Z").count(), 0);
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        fn record_into<S: ObjectLogSink>(mut sink: S) {
            let _ = sink.record(&LogEntry {
                schedule: "E_1",
                object: "X",
                access: Access::Read,
                moment: 0,
            });
        }
        let mut log = MemoryLog::default();
        record_into(&mut log);
        record_into(NoLog);
        assert_eq!(log.len(), 1);
    }
}
