//! Immutable row batches
//!
//! A dataobject is a batch of rows written once and never mutated, stored at
//! `_table_<table>_<uuid>`. Its existence and logical deletion live entirely
//! in the action log; nothing is ever physically removed from the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::ObjectStore;
use crate::types::Row;

use super::action::Action;

/// An immutable batch of rows belonging to one table.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Dataobject {
    pub table: String,
    pub name: String,
    /// Live rows, already compacted; tombstones never reach the store.
    pub rows: Vec<Row>,
    /// Number of meaningful leading entries in `rows`.
    pub len: usize,
}

/// A committed dataobject as seen through the action log.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataobjectRef {
    pub name: String,
    /// Chronological slot, taken from the AddDataobject action.
    pub tx_id: u64,
}

/// Store name of the blob holding `(table, name)`.
pub(crate) fn dataobject_blob_name(table: &str, name: &str) -> String {
    format!("_table_{}_{}", table, name)
}

/// Write the non-tombstone rows in `slots` as a fresh dataobject and return
/// the `AddDataobject` action describing it.
///
/// Callers are responsible for recording the action in the transaction.
/// `tx_id` is caller-supplied: a fresh insert passes the current transaction
/// id, a delete rewrite passes the superseded object's id so the replacement
/// keeps its chronological slot.
pub(crate) fn write_dataobject<S: ObjectStore>(
    store: &S,
    table: &str,
    slots: &[Option<Row>],
    tx_id: u64,
) -> Result<Action> {
    // Tombstones are elided here; survivors keep their relative order.
    let rows: Vec<Row> = slots.iter().filter_map(|slot| slot.clone()).collect();

    let name = Uuid::new_v4().to_string();
    let object = Dataobject {
        table: table.to_string(),
        name: name.clone(),
        len: rows.len(),
        rows,
    };

    let bytes = serde_json::to_vec(&object)?;
    store.put_if_absent(&dataobject_blob_name(table, &name), &bytes)?;

    Ok(Action::AddDataobject {
        name,
        table: object.table,
        tx_id,
    })
}

/// Fetch and decode the dataobject `(table, name)`.
pub(crate) fn read_dataobject<S: ObjectStore>(
    store: &S,
    table: &str,
    name: &str,
) -> Result<Dataobject> {
    let blob = dataobject_blob_name(table, name);
    let bytes = store.read(&blob)?;
    let object: Dataobject = serde_json::from_slice(&bytes)
        .map_err(|e| Error::Corruption(format!("malformed dataobject '{}': {}", blob, e)))?;

    if object.len > object.rows.len() {
        return Err(Error::Corruption(format!(
            "dataobject '{}' claims {} rows but stores {}",
            blob,
            object.len,
            object.rows.len()
        )));
    }
    Ok(object)
}
