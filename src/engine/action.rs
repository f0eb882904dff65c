//! Actions and the committed transaction log
//!
//! Every effect on a table is recorded as an [`Action`]. A committing
//! transaction serializes its authored actions into one log blob named
//! `_log_<20-digit id>`; the zero padding makes the store's lexicographic
//! listing equal numeric id order, which is all replay needs to recover the
//! commit history.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix shared by all committed transaction log blobs.
pub(crate) const LOG_PREFIX: &str = "_log_";

/// One effect on a table, stored in a log blob.
///
/// Serialized with an external tag; a payload carrying no known tag fails to
/// decode, which readers surface as corruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Records a new dataobject.
    ///
    /// `tx_id` is the logical chronological slot the object's rows occupy
    /// when scans order dataobjects: a fresh insert carries the authoring
    /// transaction's id, a copy-on-write rewrite carries the id of the
    /// object it replaces.
    AddDataobject {
        name: String,
        table: String,
        tx_id: u64,
    },
    /// Tombstones a previously added dataobject. `tx_id` is always the
    /// deleting transaction's id.
    DeleteDataobject {
        name: String,
        table: String,
        tx_id: u64,
    },
    /// Establishes or replaces a table's column list. The most recent
    /// occurrence in the log wins during replay.
    ChangeMetadata { table: String, columns: Vec<String> },
}

/// Serialized payload of one committed transaction.
///
/// The replay cache of prior actions is never serialized; it is rebuilt from
/// the log blobs themselves on every transaction start.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LogRecord {
    pub id: u64,
    /// Actions authored by this transaction, per table.
    pub actions: HashMap<String, Vec<Action>>,
    /// Column lists known to the transaction at commit time, per table.
    pub tables: HashMap<String, Vec<String>>,
}

/// Store name of the log blob for transaction `id`.
pub(crate) fn log_blob_name(id: u64) -> String {
    format!("{}{:020}", LOG_PREFIX, id)
}
