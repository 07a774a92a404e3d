#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use radio_core::{StationCollection, StationPaths, StationStore, StoreError};

pub const SAVE_PATH: &str = "/mem/user/stations";
pub const SAVE_DELAY: Duration = Duration::from_secs(1);

/// In-memory files plus a count of successful writes. Clones share state.
#[derive(Clone, Default)]
pub struct MemStore {
    files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
    writes: Rc<RefCell<usize>>,
    read_only: bool,
}

impl MemStore {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn put(&self, path: impl Into<PathBuf>, data: &str) {
        self.files.borrow_mut().insert(path.into(), data.as_bytes().to_vec());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(path.as_ref())
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl StationStore for MemStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::Io {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::PermissionDenied.into(),
            });
        }
        self.files.borrow_mut().insert(path.to_path_buf(), data.to_vec());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

pub fn paths(load_paths: &[&str]) -> StationPaths {
    StationPaths {
        load_paths: load_paths.iter().map(PathBuf::from).collect(),
        save_path: PathBuf::from(SAVE_PATH),
    }
}

/// A loaded collection holding exactly the given `(name, uri)` stations,
/// with no save pending.
pub fn collection_with(store: &MemStore, stations: &[(&str, &str)]) -> StationCollection<MemStore> {
    let mut markup = String::from("<Stations>");
    for (name, uri) in stations {
        markup.push_str(&format!(
            "<Station><name>{name}</name><uri>{uri}</uri></Station>"
        ));
    }
    markup.push_str("</Stations>");
    store.put("/mem/seed", &markup);

    let mut collection = StationCollection::new(paths(&["/mem/seed"]), SAVE_DELAY, store.clone());
    collection.load().unwrap();
    collection
}

pub fn names(collection: &StationCollection<MemStore>) -> Vec<String> {
    collection
        .iter()
        .map(|s| s.name_or_uri().to_owned())
        .collect()
}
