//! minilake: a minimal transactional table engine over append-only object
//! storage.
//!
//! Clients create tables, append rows, range-delete rows and scan rows inside
//! transactions. There is no coordinator, no locking and no shared memory:
//! durability, isolation and cross-process concurrency all derive from the
//! object store's atomic create-if-absent primitive.
//!
//! ## Object layout
//!
//! ```text
//! _log_00000000000000000000              # one blob per committed transaction
//! _log_00000000000000000001
//! _table_users_5e93e2a4-...              # one immutable dataobject per flush
//! ```
//!
//! Log blob ids are 20-digit zero-padded decimals, so the store's ascending
//! lexicographic listing doubles as commit order. A transaction starts by
//! replaying that listing, buffers its writes in memory, and commits by
//! atomically creating the next log blob. Two clients racing for the same id
//! resolve cleanly: exactly one create succeeds, the other observes a commit
//! conflict.
//!
//! ## Example
//!
//! ```no_run
//! use minilake::{FileObjectStore, LakeClient, Value};
//!
//! # fn main() -> minilake::Result<()> {
//! let store = FileObjectStore::new("./lake")?;
//! let mut client = LakeClient::new(store);
//!
//! client.new_tx()?;
//! client.create_table("users", vec!["id".into(), "name".into()])?;
//! client.write_row("users", vec![Value::Integer(1), Value::String("ada".into())])?;
//! client.commit_tx()?;
//!
//! client.new_tx()?;
//! for row in client.scan("users")? {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod store;
pub mod types;

pub use engine::{LakeClient, QueryRange, ScanIterator, DATAOBJECT_SIZE};
pub use error::{Error, Result};
pub use store::{FileObjectStore, MemoryObjectStore, ObjectStore, StoreError};
pub use types::{Row, Value};
