//! Per-object read/write timestamps for one schedule.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter, Result};

use hashbrown::HashMap;

use crate::timestamp::Timestamp;

/// Read and write timestamps of a single object. `None` means unset.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectState {
    pub object: String,
    pub read_ts: Option<Timestamp>,
    pub write_ts: Option<Timestamp>,
}

impl ObjectState {
    #[must_use]
    pub const fn new(object: String) -> Self {
        Self {
            object,
            read_ts: None,
            write_ts: None,
        }
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.read_ts.is_none() && self.write_ts.is_none()
    }
}

/// Wraps an optional timestamp for display, printing `NULL` when unset.
#[derive(Debug, Clone, Copy)]
pub struct Ts(pub Option<Timestamp>);

impl Display for Ts {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            Some(ts) => Display::fmt(&ts, f),
            None => f.pad("NULL"),
        }
    }
}

/// Timestamp state of every object touched by a schedule.
///
/// Objects keep insertion order: declared objects first, then objects that
/// only appear in the schedule, in order of first access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampState {
    objects: Vec<ObjectState>,
    index: HashMap<String, usize>,
}

impl TimestampState {
    /// A fully unset state for the given objects.
    pub fn with_objects<I, S>(objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::default();
        for object in objects {
            let object: String = object.into();
            state.object_mut(&object);
        }
        state
    }

    #[must_use]
    pub fn get(&self, object: &str) -> Option<&ObjectState> {
        self.index.get(object).map(|&position| &self.objects[position])
    }

    /// Returns the state of `object`, inserting an unset entry on first use.
    pub fn object_mut(&mut self, object: &str) -> &mut ObjectState {
        let position = match self.index.get(object) {
            Some(&position) => position,
            None => {
                let position = self.objects.len();
                self.objects.push(ObjectState::new(object.into()));
                self.index.insert(object.into(), position);
                position
            }
        };
        &mut self.objects[position]
    }

    #[must_use]
    pub fn read_ts(&self, object: &str) -> Option<Timestamp> {
        self.get(object).and_then(|state| state.read_ts)
    }

    #[must_use]
    pub fn write_ts(&self, object: &str) -> Option<Timestamp> {
        self.get(object).and_then(|state| state.write_ts)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectState> {
        self.objects.iter()
    }

    #[must_use]
    pub fn into_objects(self) -> Vec<ObjectState> {
        self.objects
    }
}

/// Fixed-width table with one row per object:
///
/// ```text
/// Object    TS-Read     TS-Write
/// ----------------------------------
/// X         5           NULL
/// ```
impl Display for TimestampState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "{:<10}{:<12}TS-Write", "Object", "TS-Read")?;
        writeln!(f, "{}", "-".repeat(34))?;
        for state in &self.objects {
            writeln!(
                f,
                "{:<10}{:<12}{}",
                state.object,
                Ts(state.read_ts),
                Ts(state.write_ts)
            )?;
        }
        Ok(())
    }
}
