use std::path::Path;

use crate::error::StoreError;

/// Synchronous file access used to persist the station list.
///
/// Reads and writes are small and run directly on the caller's thread.
pub trait StationStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError>;
}

/// [`StationStore`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl StationStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, data).map_err(io_err)
    }
}
