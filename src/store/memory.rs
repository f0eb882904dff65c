//! In-memory object store
//!
//! Keeps every blob in a `BTreeMap` behind a mutex; the ordered map makes the
//! lexicographic prefix listing free. Clones share the same map, so several
//! clients can race against one namespace in tests without touching disk.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{ObjectStore, StoreError};

/// Object store keeping all blobs in process memory. Not persistent.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        match objects.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(bytes.to_vec());
                Ok(())
            }
        }
    }

    fn list_prefix_ordered(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
