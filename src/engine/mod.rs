//! Transactional table engine
//!
//! ## Lifecycle
//!
//! 1. `new_tx`: replay every committed log blob in id order. The new
//!    transaction's id is one past the largest committed id and its snapshot
//!    holds every committed add/delete action.
//! 2. `create_table` / `write_row` / `delete_rows`: record actions and buffer
//!    rows in memory. Only dataobject writes touch the store before commit.
//! 3. `scan`: merge the unflushed buffer with the committed dataobjects,
//!    newest rows first.
//! 4. `commit_tx`: flush buffered rows, then atomically create `_log_<id>`.
//!    Losing the race for the id surfaces as a commit conflict.
//!
//! ## Isolation
//!
//! Snapshot isolation at transaction granularity: the snapshot is captured
//! once at `new_tx`, so commits made by other clients afterwards stay
//! invisible until the next transaction. Write-write conflicts are detected
//! at commit, at log granularity: two transactions racing for the same id
//! conflict even when their logical writes are disjoint.

mod action;
mod dataobject;
mod scan;
mod transaction;
mod writes;

pub use scan::ScanIterator;
pub use writes::QueryRange;

use crate::store::ObjectStore;
use transaction::Transaction;

/// How many rows a table buffers in memory before they are flushed to a
/// single dataobject.
pub const DATAOBJECT_SIZE: usize = 65_536;

/// A client of the table engine.
///
/// Owns a handle to the shared object store and at most one in-flight
/// transaction. All reads and writes must happen within a transaction.
/// Clients in different processes coordinate purely through the store.
pub struct LakeClient<S: ObjectStore> {
    store: S,
    /// Current transaction, if any. Only one per client at a time.
    tx: Option<Transaction>,
}

impl<S: ObjectStore> LakeClient<S> {
    /// Create a client against the given store handle.
    pub fn new(store: S) -> Self {
        Self { store, tx: None }
    }
}
