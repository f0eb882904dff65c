//! Transaction lifecycle: start, flush, commit
//!
//! A transaction starts by replaying every committed log blob in id order,
//! buffers its own writes in memory, and commits by atomically creating the
//! next log blob. The atomic create is the linearization point: of two
//! transactions racing for the same id, exactly one put succeeds and the
//! other surfaces a commit conflict. Nothing is retried internally.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{Error, Result};
use crate::store::{ObjectStore, StoreError};
use crate::types::Row;

use super::action::{log_blob_name, Action, LogRecord, LOG_PREFIX};
use super::dataobject::{write_dataobject, DataobjectRef};
use super::LakeClient;

/// In-memory state of one in-flight transaction.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    /// Monotonic id assigned at start; the commit races for `_log_<id>`.
    pub id: u64,
    /// Committed add/delete actions visible to this transaction's snapshot,
    /// per table. Rebuilt from the log at start, never serialized.
    pub previous_actions: HashMap<String, Vec<Action>>,
    /// Actions authored by this transaction, per table.
    pub actions: HashMap<String, Vec<Action>>,
    /// Column lists, from replayed metadata changes and tables created in
    /// this transaction.
    pub tables: HashMap<String, Vec<String>>,
    /// Rows not yet flushed to a dataobject, per table. `None` slots are
    /// tombstones left behind by range deletes.
    pub unflushed: HashMap<String, Vec<Option<Row>>>,
}

impl Transaction {
    /// Dataobjects added by the snapshot or by this transaction and deleted
    /// by neither, ascending by chronological slot.
    ///
    /// The sort is stable, so objects sharing a `tx_id` keep their log
    /// encounter order. This ordering is the authoritative chronology for
    /// readers.
    pub(crate) fn extant_dataobjects(&self, table: &str) -> Vec<DataobjectRef> {
        let combined: Vec<&Action> = self
            .previous_actions
            .get(table)
            .into_iter()
            .flatten()
            .chain(self.actions.get(table).into_iter().flatten())
            .collect();

        let deleted: HashSet<&str> = combined
            .iter()
            .filter_map(|action| match action {
                Action::DeleteDataobject { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let mut extant: Vec<DataobjectRef> = combined
            .iter()
            .filter_map(|action| match action {
                Action::AddDataobject { name, tx_id, .. } if !deleted.contains(name.as_str()) => {
                    Some(DataobjectRef {
                        name: name.clone(),
                        tx_id: *tx_id,
                    })
                }
                _ => None,
            })
            .collect();

        extant.sort_by_key(|object| object.tx_id);
        extant
    }
}

/// Flush a table's buffered rows into a single dataobject.
///
/// No-op when nothing is buffered. On success the buffer is cleared (its
/// capacity is retained) and the returned `AddDataobject` is recorded in the
/// transaction's actions.
pub(super) fn flush_table<S: ObjectStore>(
    store: &S,
    tx: &mut Transaction,
    table: &str,
) -> Result<()> {
    let tx_id = tx.id;
    let Some(slots) = tx.unflushed.get_mut(table) else {
        return Ok(());
    };
    if slots.is_empty() {
        return Ok(());
    }

    let buffered = slots.len();
    let action = write_dataobject(store, table, slots, tx_id)?;
    slots.clear();
    tx.actions.entry(table.to_string()).or_default().push(action);
    debug!("flushed {} buffered slots of '{}' in tx {}", buffered, table, tx_id);
    Ok(())
}

impl<S: ObjectStore> LakeClient<S> {
    /// Start a transaction by replaying the committed log.
    ///
    /// The new transaction's id is one past the largest committed id, and
    /// its snapshot holds every add/delete action committed before this call
    /// listed the log. Commits by other clients after that stay invisible
    /// until the next `new_tx`.
    pub fn new_tx(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(Error::ExistingTransaction);
        }

        let mut tx = Transaction::default();

        let log_blobs = self.store.list_prefix_ordered(LOG_PREFIX)?;
        for blob in &log_blobs {
            let bytes = self.store.read(blob)?;
            let record: LogRecord = serde_json::from_slice(&bytes)
                .map_err(|e| Error::Corruption(format!("malformed log blob '{}': {}", blob, e)))?;

            // Blobs arrive in lexicographic order, which the name padding
            // makes numeric order, so the last record seen carries the
            // largest id.
            tx.id = record.id + 1;

            for (table, actions) in record.actions {
                for action in actions {
                    match action {
                        Action::AddDataobject { .. } | Action::DeleteDataobject { .. } => {
                            tx.previous_actions
                                .entry(table.clone())
                                .or_default()
                                .push(action);
                        }
                        Action::ChangeMetadata { table, columns } => {
                            // Latest column list per table wins.
                            tx.tables.insert(table, columns);
                        }
                    }
                }
            }
        }

        debug!("started tx {} after replaying {} log blobs", tx.id, log_blobs.len());
        self.tx = Some(tx);
        Ok(())
    }

    /// Commit the current transaction.
    ///
    /// Flushes every table's buffered rows, then atomically writes one log
    /// blob. A transaction that authored no actions commits without touching
    /// the store, so read-only transactions never race. In every outcome,
    /// success or failure, the client's transaction slot is cleared.
    pub fn commit_tx(&mut self) -> Result<()> {
        // Taking the transaction up front clears the slot in every outcome.
        let Some(mut tx) = self.tx.take() else {
            return Err(Error::NoTransaction);
        };

        let tables: Vec<String> = tx.tables.keys().cloned().collect();
        for table in &tables {
            flush_table(&self.store, &mut tx, table)?;
        }

        let wrote = tx.actions.values().any(|actions| !actions.is_empty());
        if !wrote {
            debug!("tx {} was read-only, nothing to commit", tx.id);
            return Ok(());
        }

        // The snapshot cache is derived state; only authored actions and the
        // table metadata are persisted.
        let record = LogRecord {
            id: tx.id,
            actions: tx.actions,
            tables: tx.tables,
        };
        let bytes = serde_json::to_vec(&record)?;

        match self.store.put_if_absent(&log_blob_name(record.id), &bytes) {
            Ok(()) => {
                debug!("committed tx {}", record.id);
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!("tx {} lost the commit race", record.id);
                Err(Error::CommitConflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel the current transaction by abandoning it.
    ///
    /// Nothing is written: buffered rows and authored actions are discarded
    /// and the slot is cleared. Abandoning with no transaction in flight is
    /// a no-op.
    pub fn abandon_tx(&mut self) {
        if let Some(tx) = self.tx.take() {
            debug!("abandoned tx {}", tx.id);
        }
    }
}
