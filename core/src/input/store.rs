//! Per-device button mappings: the working copies the adapters read and the
//! durable key-value store they are saved to.
//!
//! Each device identity has one working mapping, held in a [`MappingHandle`]
//! shared with every adapter bound to that device. Edits replace the whole
//! mapping in a single store, so an adapter sampling at LATCH time sees either
//! the old mapping or the new one.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use super::button::SnesButton;
use super::mapping::ButtonMapping;

/// Durable string store keyed by device identity.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key` as a unit.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Errors from a [`KeyValueStore`] backend.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying I/O error.
    Io(std::io::Error),

    /// The backing data could not be parsed or encoded.
    Format(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(msg) => write!(f, "bad mapping store: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Volatile [`KeyValueStore`].
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Shared working mapping for one device.
#[derive(Clone, Debug)]
pub struct MappingHandle(Rc<Cell<ButtonMapping>>);

impl MappingHandle {
    pub fn new(mapping: ButtonMapping) -> Self {
        Self(Rc::new(Cell::new(mapping)))
    }

    /// Consistent copy of the current mapping.
    pub fn snapshot(&self) -> ButtonMapping {
        self.0.get()
    }

    pub fn replace(&self, mapping: ButtonMapping) {
        self.0.set(mapping);
    }
}

/// Working and persisted button mappings, keyed by device identity.
pub struct MappingStore {
    backend: Box<dyn KeyValueStore>,
    working: HashMap<String, MappingHandle>,
}

impl MappingStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            working: HashMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Persisted mapping for `device_id`, or the canonical default when none
    /// is stored or the stored record is unreadable.
    pub fn load(&self, device_id: &str) -> ButtonMapping {
        let record = match self.backend.get(device_id) {
            Ok(Some(record)) => record,
            Ok(None) => return ButtonMapping::new(),
            Err(e) => {
                warn!(device_id, error = %e, "mapping store read failed, using default mapping");
                return ButtonMapping::new();
            }
        };

        ButtonMapping::from_record(&record).unwrap_or_else(|e| {
            warn!(device_id, error = %e, "ignoring malformed stored mapping");
            ButtonMapping::new()
        })
    }

    /// Persist `mapping` for `device_id` and make it the working mapping.
    pub fn save(&mut self, device_id: &str, mapping: &ButtonMapping) -> Result<(), StoreError> {
        self.backend.set(device_id, mapping.to_record())?;
        self.handle(device_id).replace(*mapping);
        debug!(device_id, "saved button mapping");
        Ok(())
    }

    /// Persist the current working mapping for `device_id`.
    pub fn save_working(&mut self, device_id: &str) -> Result<(), StoreError> {
        let mapping = self.working(device_id);
        self.save(device_id, &mapping)
    }

    /// Rebind one button in the working mapping. Not persisted until saved.
    pub fn set(&mut self, device_id: &str, button: SnesButton, host: Option<u8>) {
        let handle = self.handle(device_id);
        let mut mapping = handle.snapshot();
        mapping.set(button, host);
        handle.replace(mapping);
        debug!(device_id, %button, ?host, "remapped button");
    }

    /// Working mapping for `device_id`, loaded from the backend on first use.
    pub fn working(&mut self, device_id: &str) -> ButtonMapping {
        self.handle(device_id).snapshot()
    }

    /// Shared handle to the working mapping for `device_id`.
    pub fn handle(&mut self, device_id: &str) -> MappingHandle {
        if let Some(handle) = self.working.get(device_id) {
            return handle.clone();
        }
        let handle = MappingHandle::new(self.load(device_id));
        self.working.insert(device_id.to_string(), handle.clone());
        handle
    }

    /// Discard unsaved edits for `device_id`.
    pub fn revert(&mut self, device_id: &str) {
        let persisted = self.load(device_id);
        self.handle(device_id).replace(persisted);
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}
