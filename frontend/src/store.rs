//! Button mappings persisted in a TOML file, one JSON record per device:
//!
//! ```toml
//! [devices]
//! "Xbox Series X Controller" = '{"A":8,"B":0,...}'
//! ```
//!
//! Every save rewrites the whole file through a temporary file and a rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snespad_core::input::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MappingFile {
    #[serde(default)]
    devices: BTreeMap<String, String>,
}

pub struct FileStore {
    path: PathBuf,
    contents: MappingFile,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).map_err(|e| StoreError::Format(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MappingFile::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            contents,
        })
    }

    /// An empty store that will write to `path` on the first save.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            contents: MappingFile::default(),
        }
    }

    fn write(&self, contents: &MappingFile) -> Result<(), StoreError> {
        let text = toml::to_string(contents).map_err(|e| StoreError::Format(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.contents.devices.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut updated = self.contents.clone();
        updated.devices.insert(key.to_string(), value);
        self.write(&updated)?;
        self.contents = updated;
        Ok(())
    }
}
