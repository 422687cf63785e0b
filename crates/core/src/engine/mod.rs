//! The Basic timestamp-ordering engine.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use derive_more::From;

use self::sink::{LogEntry, ObjectLogSink};
use self::step::{Check, Step};
use crate::schedule::{Access, Action, Moment, Schedule};
use crate::state::{ObjectState, TimestampState};
use crate::timestamp::{Timestamp, TimestampTable};
use crate::verdict::Verdict;

pub mod sink;
pub mod step;

/// What to do when an operation names a transaction without a timestamp.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum UnknownTransaction {
    /// Treat the transaction as having timestamp `0`.
    #[default]
    Zero,
    /// Stop with [`Error::UnknownTransaction`].
    Reject,
}

/// Error that stops schedule processing. Conflicts are not errors.
#[derive(Debug, PartialEq, Eq, From)]
pub enum Error<E> {
    /// An operation named an undeclared transaction under
    /// [`UnknownTransaction::Reject`].
    UnknownTransaction {
        schedule: String,
        transaction: String,
        moment: Moment,
    },
    /// The object log sink failed.
    #[from]
    Sink(E),
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownTransaction {
                schedule,
                transaction,
                moment,
            } => write!(
                f,
                "{schedule}: transaction `{transaction}` at moment {moment} has no timestamp"
            ),
            Self::Sink(e) => write!(f, "object log: {e}"),
        }
    }
}

impl<E> core::error::Error for Error<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::UnknownTransaction { .. } => None,
            Self::Sink(e) => Some(e),
        }
    }
}

/// Result of running one schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    /// One step per processed operation; on rollback the last step is the
    /// conflicting one.
    pub steps: Vec<Step>,
    /// Object timestamps when processing stopped.
    pub state: TimestampState,
}

/// Runs schedules against a fixed timestamp table.
///
/// Every call to [`run`](Self::run) starts from a fresh, fully unset
/// [`TimestampState`], so nothing carries over between schedules.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    table: &'a TimestampTable,
    objects: &'a [String],
    unknown: UnknownTransaction,
}

impl<'a> Scheduler<'a> {
    /// `objects` are the declared objects; they appear first in the final
    /// state, in this order.
    #[must_use]
    pub const fn new(table: &'a TimestampTable, objects: &'a [String]) -> Self {
        Self {
            table,
            objects,
            unknown: UnknownTransaction::Zero,
        }
    }

    #[must_use]
    pub const fn with_unknown_transaction(mut self, policy: UnknownTransaction) -> Self {
        self.unknown = policy;
        self
    }

    /// Processes `schedule` in moment order, stopping at the first conflict.
    ///
    /// Every read and write is passed to `sink` before it is checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTransaction`] for an undeclared transaction
    /// when the policy is [`UnknownTransaction::Reject`], and
    /// [`Error::Sink`] when the sink fails.
    pub fn run<S>(&self, schedule: &Schedule, sink: &mut S) -> Result<Outcome, Error<S::Error>>
    where
        S: ObjectLogSink + ?Sized,
    {
        tracing::debug!(
            schedule = %schedule.id,
            operations = schedule.len(),
            "processing schedule"
        );

        let mut state = TimestampState::with_objects(self.objects.iter().map(String::as_str));
        let mut steps = Vec::with_capacity(schedule.len());

        for operation in schedule {
            let moment = operation.moment;
            let (access, object) = match &operation.action {
                Action::Commit { .. } => {
                    steps.push(Step {
                        moment,
                        action: operation.action.clone(),
                        check: Check::Commit,
                    });
                    continue;
                }
                Action::Read { object, .. } => (Access::Read, object),
                Action::Write { object, .. } => (Access::Write, object),
            };

            let timestamp = self.timestamp(&schedule.id, operation.action.transaction(), moment)?;

            sink.record(&LogEntry {
                schedule: &schedule.id,
                object,
                access,
                moment,
            })?;

            let check = apply(state.object_mut(object), access, timestamp);
            tracing::trace!(
                schedule = %schedule.id,
                moment,
                action = %operation.action,
                ?check,
                "timestamp check"
            );
            steps.push(Step {
                moment,
                action: operation.action.clone(),
                check,
            });

            if !check.accepted() {
                tracing::debug!(schedule = %schedule.id, moment, "conflict, rolling back");
                return Ok(Outcome {
                    verdict: Verdict::Rollback {
                        schedule: schedule.id.clone(),
                        moment,
                    },
                    steps,
                    state,
                });
            }
        }

        tracing::debug!(schedule = %schedule.id, "schedule completed");
        Ok(Outcome {
            verdict: Verdict::Ok {
                schedule: schedule.id.clone(),
            },
            steps,
            state,
        })
    }

    fn timestamp<E>(
        &self,
        schedule: &str,
        transaction: &str,
        moment: Moment,
    ) -> Result<Timestamp, Error<E>> {
        match (self.table.get(transaction), self.unknown) {
            (Some(timestamp), _) => Ok(timestamp),
            (None, UnknownTransaction::Zero) => {
                tracing::debug!(transaction, moment, "unknown transaction, using timestamp 0");
                Ok(0)
            }
            (None, UnknownTransaction::Reject) => Err(Error::UnknownTransaction {
                schedule: schedule.to_string(),
                transaction: transaction.to_string(),
                moment,
            }),
        }
    }
}

/// Applies the TO rule for one access, mutating `object` only when accepted.
///
/// - Read conflicts iff `write_ts > ts`; on success
///   `read_ts := max(read_ts, ts)`.
/// - Write conflicts iff `read_ts > ts` or `write_ts > ts`; on success
///   `write_ts := ts`.
///
/// Unset timestamps never conflict.
fn apply(object: &mut ObjectState, access: Access, timestamp: Timestamp) -> Check {
    let read_ts = object.read_ts;
    let write_ts = object.write_ts;
    let younger = |ts: Option<Timestamp>| ts.is_some_and(|ts| ts > timestamp);

    match access {
        Access::Read => {
            let accepted = !younger(write_ts);
            if accepted {
                object.read_ts = Some(read_ts.map_or(timestamp, |ts| ts.max(timestamp)));
            }
            Check::Read {
                timestamp,
                read_ts,
                write_ts,
                accepted,
            }
        }
        Access::Write => {
            let accepted = !younger(read_ts) && !younger(write_ts);
            if accepted {
                object.write_ts = Some(timestamp);
            }
            Check::Write {
                timestamp,
                read_ts,
                write_ts,
                accepted,
            }
        }
    }
}
