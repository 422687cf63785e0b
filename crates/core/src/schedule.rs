use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Result};

/// Zero-based position of an operation within its schedule.
pub type Moment = u64;

/// Kind of object access, as recorded in object logs.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl Display for Access {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Read => f.write_str("Read"),
            Self::Write => f.write_str("Write"),
        }
    }
}

/// A single step issued by a transaction.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Read { transaction: String, object: String },
    Write { transaction: String, object: String },
    Commit { transaction: String },
}

impl Action {
    pub const fn read(transaction: String, object: String) -> Self {
        Self::Read {
            transaction,
            object,
        }
    }

    pub const fn write(transaction: String, object: String) -> Self {
        Self::Write {
            transaction,
            object,
        }
    }

    pub const fn commit(transaction: String) -> Self {
        Self::Commit { transaction }
    }

    #[must_use]
    pub fn transaction(&self) -> &str {
        match self {
            Self::Read { transaction, .. }
            | Self::Write { transaction, .. }
            | Self::Commit { transaction } => transaction,
        }
    }

    /// The accessed object, `None` for commits.
    #[must_use]
    pub fn object(&self) -> Option<&str> {
        match self {
            Self::Read { object, .. } | Self::Write { object, .. } => Some(object),
            Self::Commit { .. } => None,
        }
    }

    #[must_use]
    pub const fn access(&self) -> Option<Access> {
        match self {
            Self::Read { .. } => Some(Access::Read),
            Self::Write { .. } => Some(Access::Write),
            Self::Commit { .. } => None,
        }
    }
}

/// Transaction index as written in schedule text: `t12` is written `12`.
fn short_name(transaction: &str) -> &str {
    transaction.strip_prefix('t').unwrap_or(transaction)
}

/// Renders the schedule-text form: `r1(X)`, `w2(Y)`, `c1`.
impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Read {
                transaction,
                object,
            } => write!(f, "r{}({object})", short_name(transaction)),
            Self::Write {
                transaction,
                object,
            } => write!(f, "w{}({object})", short_name(transaction)),
            Self::Commit { transaction } => write!(f, "c{}", short_name(transaction)),
        }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(self, f)
    }
}

/// An action together with its moment in the schedule.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub moment: Moment,
    pub action: Action,
}

/// A named, totally ordered sequence of operations.
///
/// Moments are assigned by the schedule itself, so they are always
/// `0, 1, 2, ...` in order.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub id: String,
    operations: Vec<Operation>,
}

impl Schedule {
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self {
            id,
            operations: Vec::new(),
        }
    }

    /// Builds a schedule, numbering `actions` in order.
    pub fn from_actions<I>(id: String, actions: I) -> Self
    where
        I: IntoIterator<Item = Action>,
    {
        let mut schedule = Self::new(id);
        schedule.extend(actions);
        schedule
    }

    /// Appends an action and returns the moment it was given.
    pub fn push(&mut self, action: Action) -> Moment {
        let moment = self.operations.len() as Moment;
        self.operations.push(Operation { moment, action });
        moment
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }
}

impl Extend<Action> for Schedule {
    fn extend<I: IntoIterator<Item = Action>>(&mut self, actions: I) {
        for action in actions {
            self.push(action);
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Operation;
    type IntoIter = core::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Canonical schedule line: `E_1-r1(X) w2(X) c1`.
impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}-", self.id)?;
        for (i, operation) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", operation.action)?;
        }
        Ok(())
    }
}
