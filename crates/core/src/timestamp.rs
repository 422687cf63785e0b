//! Transaction timestamps, fixed once per run.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use hashbrown::HashMap;

/// Logical timestamp assigned to a transaction.
pub type Timestamp = i64;

/// A declared transaction and its fixed timestamp.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub id: String,
    pub timestamp: Timestamp,
}

/// Error building a [`TimestampTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The number of declared transactions and timestamps differ.
    LengthMismatch {
        transactions: usize,
        timestamps: usize,
    },
    /// The same transaction id was declared twice.
    DuplicateTransaction { id: String },
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LengthMismatch {
                transactions,
                timestamps,
            } => write!(
                f,
                "{transactions} transactions declared but {timestamps} timestamps"
            ),
            Self::DuplicateTransaction { id } => {
                write!(f, "transaction `{id}` declared more than once")
            }
        }
    }
}

impl core::error::Error for TableError {}

/// Mapping from transaction id to its timestamp.
///
/// Keeps declaration order for display; lookups go through a hash index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampTable {
    transactions: Vec<Transaction>,
    index: HashMap<String, usize>,
}

impl TimestampTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs declared transaction ids with declared timestamps in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::LengthMismatch`] when the two lists differ in
    /// length and [`TableError::DuplicateTransaction`] when an id repeats.
    pub fn from_declarations(
        ids: Vec<String>,
        timestamps: &[Timestamp],
    ) -> Result<Self, TableError> {
        if ids.len() != timestamps.len() {
            return Err(TableError::LengthMismatch {
                transactions: ids.len(),
                timestamps: timestamps.len(),
            });
        }
        let mut table = Self::new();
        for (id, timestamp) in ids.into_iter().zip(timestamps.iter().copied()) {
            table.insert(id, timestamp)?;
        }
        Ok(table)
    }

    /// Adds a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateTransaction`] if `id` is already present.
    pub fn insert(&mut self, id: String, timestamp: Timestamp) -> Result<(), TableError> {
        if self.index.contains_key(&id) {
            return Err(TableError::DuplicateTransaction { id });
        }
        self.index.insert(id.clone(), self.transactions.len());
        self.transactions.push(Transaction { id, timestamp });
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Timestamp> {
        self.index
            .get(id)
            .map(|&position| self.transactions[position].timestamp)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Transactions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }
}

impl<'a> IntoIterator for &'a TimestampTable {
    type Item = &'a Transaction;
    type IntoIter = core::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
