//! Snapshot scans
//!
//! A scan yields one table's rows in reverse-chronological order: the
//! transaction's own unflushed rows first (newest buffered write first),
//! then the committed dataobjects from the most recent chronological slot
//! backwards, each walked from its last row down to its first. Dataobjects
//! are fetched lazily, one at a time, as the iteration reaches them.

use crate::error::{Error, Result};
use crate::store::ObjectStore;
use crate::types::Row;

use super::dataobject::{read_dataobject, Dataobject, DataobjectRef};
use super::LakeClient;

/// Lazy row iterator over one table's snapshot.
///
/// Captures the unflushed buffer and the extant dataobject list at creation
/// time; writes made through the client afterwards are not observed. The
/// iterator borrows the client shared, so the client cannot be mutated while
/// any scan is alive, and several scans may run concurrently.
pub struct ScanIterator<'a, S: ObjectStore> {
    client: &'a LakeClient<S>,
    table: String,

    /// Snapshot of the unflushed slots, walked from the highest index down.
    unflushed: Vec<Option<Row>>,
    /// Slots at and above this index have already been yielded or skipped.
    unflushed_pos: usize,

    /// Extant dataobjects in chronological order, walked from the back.
    dataobjects: Vec<DataobjectRef>,
    dataobjects_pos: usize,

    /// Currently loaded dataobject and how many of its rows remain.
    current: Option<(Dataobject, usize)>,
}

impl<S: ObjectStore> LakeClient<S> {
    /// Scan a table's rows in reverse-chronological order.
    ///
    /// Requires an active transaction. Scanning a table the transaction has
    /// never heard of yields an empty iteration.
    pub fn scan(&self, table: &str) -> Result<ScanIterator<'_, S>> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(Error::NoTransaction);
        };

        let unflushed = tx.unflushed.get(table).cloned().unwrap_or_default();
        let dataobjects = tx.extant_dataobjects(table);

        Ok(ScanIterator {
            client: self,
            table: table.to_string(),
            unflushed_pos: unflushed.len(),
            unflushed,
            dataobjects_pos: dataobjects.len(),
            dataobjects,
            current: None,
        })
    }
}

impl<'a, S: ObjectStore> ScanIterator<'a, S> {
    /// Fallible next(), yielding the next live row, or `None` on exhaustion.
    fn try_next(&mut self) -> Result<Option<Row>> {
        // Unflushed rows first, newest write first, skipping tombstones.
        while self.unflushed_pos > 0 {
            self.unflushed_pos -= 1;
            if let Some(row) = self.unflushed[self.unflushed_pos].take() {
                return Ok(Some(row));
            }
        }

        // Then committed dataobjects, most recent chronological slot first.
        loop {
            if let Some((object, remaining)) = self.current.as_mut() {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(Some(object.rows[*remaining].clone()));
                }
                // Exhausted; drop it and move to the previous object.
                self.current = None;
            }

            if self.dataobjects_pos == 0 {
                return Ok(None);
            }
            self.dataobjects_pos -= 1;
            let object_ref = &self.dataobjects[self.dataobjects_pos];
            let object = read_dataobject(&self.client.store, &self.table, &object_ref.name)?;
            let remaining = object.len;
            self.current = Some((object, remaining));
        }
    }
}

impl<'a, S: ObjectStore> Iterator for ScanIterator<'a, S> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}
