//! Error types for minilake
//!
//! Defines a unified error type covering the transaction lifecycle, the
//! mutation surface and the object-store boundary.

use std::fmt;

use crate::store::StoreError;

/// Unified error type for engine operations
#[derive(Debug)]
pub enum Error {
    /// `new_tx` while a transaction is already in progress
    ExistingTransaction,
    /// Mutation or scan without an active transaction
    NoTransaction,
    /// `create_table` on a table this transaction already knows
    TableExists(String),
    /// Write or delete against an unknown table, or an unknown column
    NoSuchTable(String),
    /// Range predicate endpoints incompatible with each other or with the
    /// row data they were evaluated against
    TypeMismatch,
    /// Another transaction claimed this log id first. The transaction has
    /// been discarded; the caller may retry by starting a new one.
    CommitConflict,
    /// Underlying object-store I/O or payload serialization failure
    Store(StoreError),
    /// Malformed log or dataobject payload
    Corruption(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ExistingTransaction => write!(f, "a transaction is already in progress"),
            Error::NoTransaction => write!(f, "no transaction in progress"),
            Error::TableExists(name) => write!(f, "table '{}' already exists", name),
            Error::NoSuchTable(name) => write!(f, "no such table or column '{}'", name),
            Error::TypeMismatch => write!(f, "type mismatch in range predicate"),
            Error::CommitConflict => write!(f, "commit conflict: log id already claimed"),
            Error::Store(e) => write!(f, "{}", e),
            Error::Corruption(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Store(StoreError::Serde(e.to_string()))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;
