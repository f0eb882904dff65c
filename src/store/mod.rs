//! The object-store boundary
//!
//! The engine depends on a flat namespace of immutable named blobs with
//! exactly three operations. The atomic create is the linearization point
//! for commits; the ordered listing is how replay recovers commit order.
//! With those two, no server-side coordination is needed at all.

use std::fmt;
use std::io;

mod file;
mod memory;

pub use file::FileObjectStore;
pub use memory::MemoryObjectStore;

/// Error type for object-store operations
#[derive(Debug)]
pub enum StoreError {
    /// `put_if_absent` target name is already taken
    AlreadyExists(String),
    /// `read` target does not exist
    NotFound(String),
    /// Underlying I/O failure
    Io(io::Error),
    /// Payload serialization failed while producing a blob
    Serde(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::AlreadyExists(name) => write!(f, "object '{}' already exists", name),
            StoreError::NotFound(name) => write!(f, "object '{}' not found", name),
            StoreError::Io(e) => write!(f, "{}", e),
            StoreError::Serde(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// A flat namespace of immutable named blobs.
///
/// Implementations are cheap-to-clone handles: clones observe the same
/// namespace, which is how several clients share one store. All
/// synchronization between clients happens through [`put_if_absent`];
/// blobs are never mutated or removed once created.
///
/// [`put_if_absent`]: ObjectStore::put_if_absent
pub trait ObjectStore {
    /// Atomically create the blob `name` with the given payload.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the name is taken. This is
    /// the sole primitive enabling concurrent commit ordering; there must be
    /// no window in which a partial payload is observable under `name`.
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Every blob name beginning with `prefix`, in ascending lexicographic
    /// order, without duplicates.
    fn list_prefix_ordered(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// The full payload of `name`, or [`StoreError::NotFound`].
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;
}
