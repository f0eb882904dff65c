//! Local-directory object store
//!
//! One file per blob in a single flat directory. A put stages the payload in
//! a temp file in the same directory, fsyncs it, then hard-links it to the
//! final name. The link syscall is the atomic create: it fails if the target
//! exists, which is exactly the put-if-absent contract, and readers can never
//! observe a partially-written blob under its final name.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::{ObjectStore, StoreError};

/// Object store backed by a single flat directory.
///
/// Clones share the directory and therefore the namespace.
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    dir: PathBuf,
}

impl FileObjectStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

/// Reject object names that could escape the store directory.
fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid object name '{}'", name),
        )));
    }
    Ok(())
}

impl ObjectStore for FileObjectStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_name(name)?;

        // Stage in the same directory so the link below never crosses a
        // filesystem boundary. The temp file is unlinked on drop; the hard
        // link, once created, survives it.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        match fs::hard_link(tmp.path(), self.dir.join(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn list_prefix_ordered(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Ok(name) = entry.file_name().into_string() {
                if name.starts_with(prefix) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(name)?;
        match fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
