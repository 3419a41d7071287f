//! Lookup store collaborator.
//!
//! The store answers exactly two questions: which image filenames belong
//! to a transaction, and which transaction (with its stored inference
//! response) owns a filename. The trait keeps the pipeline stages
//! testable against an in-memory store; production uses the PostgreSQL
//! implementation.

mod postgres;

pub use postgres::PgStore;

use std::fmt;

use crate::error::HarvestError;

/// Opaque identifier of a source transaction, the join key between the
/// filename lookup and payload retrieval.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub i64);

impl TransactionId {
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transaction's stored inference response, joined through a filename.
#[derive(Clone, Debug)]
pub struct TransactionPayload {
    pub transaction_id: TransactionId,
    /// Raw response text as persisted by the producer; see
    /// [`crate::payload`] for what it contains.
    pub response: String,
}

/// Query capabilities required from the lookup store.
pub trait LookupStore {
    /// All image filenames recorded for a transaction, in store order.
    fn filenames_for_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Vec<String>, HarvestError>;

    /// The owning transaction and its response payload for a filename,
    /// if any record exists.
    fn payload_for_filename(
        &mut self,
        file_name: &str,
    ) -> Result<Option<TransactionPayload>, HarvestError>;
}
