//! The mutation surface: table creation, row writes, range deletes
//!
//! All three operations only edit the in-memory transaction, with one
//! exception: a range delete over committed rows performs copy-on-write
//! rewrites, which write replacement dataobjects immediately. The log entry
//! making those rewrites visible still waits for commit.

use log::debug;

use crate::error::{Error, Result};
use crate::store::ObjectStore;
use crate::types::{Row, Value};

use super::action::Action;
use super::dataobject::{read_dataobject, write_dataobject};
use super::transaction::flush_table;
use super::{LakeClient, DATAOBJECT_SIZE};

/// Inclusive range over a single column, used by [`LakeClient::delete_rows`].
///
/// Both endpoints must be integers or both strings. An integer range accepts
/// a row value that is either an integer or a float with no fractional part,
/// covering serializers that widen integers on round-trip. Any other
/// combination is a type mismatch.
#[derive(Debug, Clone)]
pub struct QueryRange {
    pub start: Value,
    pub end: Value,
}

impl QueryRange {
    /// Whether the value at `column_index` of `row` falls inside this range.
    fn matches(&self, column_index: usize, row: &Row) -> Result<bool> {
        let value = row.get(column_index).ok_or(Error::TypeMismatch)?;

        match (&self.start, &self.end) {
            (Value::Integer(start), Value::Integer(end)) => {
                let value = value.as_int().ok_or(Error::TypeMismatch)?;
                Ok(*start <= value && value <= *end)
            }
            (Value::String(start), Value::String(end)) => match value {
                Value::String(value) => Ok(start <= value && value <= end),
                _ => Err(Error::TypeMismatch),
            },
            _ => Err(Error::TypeMismatch),
        }
    }
}

impl<S: ObjectStore> LakeClient<S> {
    /// Create a table with the given column list.
    ///
    /// Records the columns in the transaction and appends a metadata action
    /// so future transactions replay it.
    pub fn create_table(&mut self, table: &str, columns: Vec<String>) -> Result<()> {
        let Some(tx) = self.tx.as_mut() else {
            return Err(Error::NoTransaction);
        };
        if tx.tables.contains_key(table) {
            return Err(Error::TableExists(table.to_string()));
        }

        tx.tables.insert(table.to_string(), columns.clone());
        tx.actions
            .entry(table.to_string())
            .or_default()
            .push(Action::ChangeMetadata {
                table: table.to_string(),
                columns,
            });
        Ok(())
    }

    /// Append a row to a table's unflushed buffer.
    ///
    /// The buffer is created on first use and flushed to a dataobject when
    /// it reaches [`DATAOBJECT_SIZE`] rows. A failed flush discards the
    /// transaction, since its in-memory state no longer matches the store.
    pub fn write_row(&mut self, table: &str, row: Row) -> Result<()> {
        let Some(tx) = self.tx.as_mut() else {
            return Err(Error::NoTransaction);
        };
        if !tx.tables.contains_key(table) {
            return Err(Error::NoSuchTable(table.to_string()));
        }

        let full = tx
            .unflushed
            .get(table)
            .map_or(false, |slots| slots.len() == DATAOBJECT_SIZE);
        if full {
            if let Err(e) = flush_table(&self.store, tx, table) {
                self.tx = None;
                return Err(e);
            }
        }

        tx.unflushed
            .entry(table.to_string())
            .or_insert_with(|| Vec::with_capacity(DATAOBJECT_SIZE))
            .push(Some(row));
        Ok(())
    }

    /// Delete every row whose `column` value falls inside `range`.
    ///
    /// Unflushed rows are tombstoned in place. Committed rows are removed by
    /// copy-on-write: each dataobject with a matching row is rewritten
    /// without those rows (keeping the superseded object's chronological
    /// slot) and the original is tombstoned in the log with the current
    /// transaction's id. A range matching nothing changes nothing.
    pub fn delete_rows(&mut self, table: &str, column: &str, range: QueryRange) -> Result<()> {
        let Some(tx) = self.tx.as_mut() else {
            return Err(Error::NoTransaction);
        };

        let column_index = tx
            .tables
            .get(table)
            .ok_or_else(|| Error::NoSuchTable(table.to_string()))?
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::NoSuchTable(column.to_string()))?;

        if let Some(slots) = tx.unflushed.get_mut(table) {
            for slot in slots.iter_mut() {
                let matched = match slot {
                    Some(row) => range.matches(column_index, row)?,
                    None => false,
                };
                if matched {
                    *slot = None;
                }
            }
        }

        let current_id = tx.id;
        for object_ref in tx.extant_dataobjects(table) {
            let object = read_dataobject(&self.store, table, &object_ref.name)?;

            let mut kept: Vec<Option<Row>> = Vec::with_capacity(object.len);
            for row in &object.rows[..object.len] {
                if !range.matches(column_index, row)? {
                    kept.push(Some(row.clone()));
                }
            }
            if kept.len() == object.len {
                continue;
            }

            debug!(
                "rewriting dataobject '{}' of '{}': kept {} of {} rows",
                object_ref.name,
                table,
                kept.len(),
                object.len
            );

            // The replacement pins itself to the superseded object's
            // chronological slot; a rewrite left with zero rows is not
            // written at all.
            if !kept.is_empty() {
                let add = write_dataobject(&self.store, table, &kept, object_ref.tx_id)?;
                tx.actions.entry(table.to_string()).or_default().push(add);
            }
            tx.actions
                .entry(table.to_string())
                .or_default()
                .push(Action::DeleteDataobject {
                    name: object_ref.name,
                    table: table.to_string(),
                    tx_id: current_id,
                });
        }

        Ok(())
    }
}
