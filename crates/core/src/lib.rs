//! Basic timestamp-ordering (TO) scheduling for transactional schedules.
//!
//! `tscop_core` decides, operation by operation, whether an interleaved
//! schedule of reads, writes and commits can complete under the Basic TO
//! protocol or has to roll back. Every transaction carries a fixed logical
//! timestamp, and every object tracks two values for the duration of one
//! schedule:
//!
//! - **`read_ts`** -- the largest timestamp of a transaction that read it.
//! - **`write_ts`** -- the timestamp of the last transaction that wrote it.
//!
//! A read by `T` conflicts when the object was written by a younger
//! transaction (`write_ts > ts(T)`). A write by `T` conflicts when the object
//! was already read or written by a younger transaction
//! (`read_ts > ts(T)` or `write_ts > ts(T)`). The first conflict stops the
//! schedule and yields [`Verdict::Rollback`] at that operation's moment;
//! otherwise the schedule ends with [`Verdict::Ok`].
//!
//! # Entry point
//!
//! The main entry point is [`Scheduler::run`], which takes a [`Schedule`] and
//! an [`ObjectLogSink`](engine::sink::ObjectLogSink) receiving every read and
//! write before it is checked.
//!
//! ```rust,ignore
//! use tscop_core::{Scheduler, Verdict};
//!
//! let scheduler = Scheduler::new(&table, &objects);
//! let outcome = scheduler.run(&schedule, &mut MemoryLog::default())?;
//! match outcome.verdict {
//!     Verdict::Ok { .. } => println!("completed"),
//!     Verdict::Rollback { moment, .. } => println!("rolled back at {moment}"),
//! }
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on the data
//!   model (`Action`, `Operation`, `Verdict`, `Step`, `ObjectState`).
//! - **`schemars`** -- additionally derives `JsonSchema` for the same types.
//!
//! This crate is `no_std` compatible (requires `alloc`). Reading the input
//! file and tokenizing schedule text live in the separate `tscop_parser`
//! crate.

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod engine;
pub mod schedule;
pub mod state;
pub mod timestamp;
pub mod verdict;

pub use engine::{Outcome, Scheduler, UnknownTransaction};
pub use schedule::{Action, Moment, Operation, Schedule};
pub use timestamp::{Timestamp, TimestampTable};
pub use verdict::Verdict;
