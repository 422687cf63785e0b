//! Trace of the per-operation timestamp checks.

use core::fmt::{Display, Formatter, Result};

use crate::schedule::{Action, Moment};
use crate::state::Ts;
use crate::timestamp::Timestamp;

/// The check performed for one operation and what it decided.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// Commits are observed only.
    Commit,
    Read {
        timestamp: Timestamp,
        /// `read_ts` of the object before the read.
        read_ts: Option<Timestamp>,
        /// `write_ts` of the object before the read.
        write_ts: Option<Timestamp>,
        accepted: bool,
    },
    Write {
        timestamp: Timestamp,
        /// `read_ts` of the object before the write.
        read_ts: Option<Timestamp>,
        /// `write_ts` of the object before the write.
        write_ts: Option<Timestamp>,
        accepted: bool,
    },
}

impl Check {
    /// `false` only for the operation that forced a rollback.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        match self {
            Self::Commit => true,
            Self::Read { accepted, .. } | Self::Write { accepted, .. } => *accepted,
        }
    }
}

/// One processed operation of a schedule.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub moment: Moment,
    pub action: Action,
    pub check: Check,
}

impl Step {
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.check.accepted()
    }
}

/// Console trace line, e.g.
/// `moment 1: w2(X) [ts=3] -> ts(t2)=3 vs read_ts(X)=5, write_ts(X)=NULL -> conflict, rollback`.
impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "moment {}: {}", self.moment, self.action)?;
        let transaction = self.action.transaction();
        let object = self.action.object().unwrap_or_default();
        match self.check {
            Check::Commit => f.write_str(" (commit)"),
            Check::Read {
                timestamp,
                read_ts,
                write_ts,
                accepted,
            } => {
                write!(
                    f,
                    " [ts={timestamp}] -> ts({transaction})={timestamp} vs write_ts({object})={}",
                    Ts(write_ts)
                )?;
                if accepted {
                    let read_ts = read_ts.map_or(timestamp, |read_ts| read_ts.max(timestamp));
                    write!(f, " -> ok, read_ts({object}) = {read_ts}")
                } else {
                    f.write_str(" -> conflict, rollback")
                }
            }
            Check::Write {
                timestamp,
                read_ts,
                write_ts,
                accepted,
            } => {
                write!(
                    f,
                    " [ts={timestamp}] -> ts({transaction})={timestamp} vs read_ts({object})={}, write_ts({object})={}",
                    Ts(read_ts),
                    Ts(write_ts)
                )?;
                if accepted {
                    write!(f, " -> ok, write_ts({object}) = {timestamp}")
                } else {
                    f.write_str(" -> conflict, rollback")
                }
            }
        }
    }
}
