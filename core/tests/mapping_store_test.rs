use std::cell::RefCell;
use std::rc::Rc;

use snespad_core::input::{
    ButtonMapping, KeyValueStore, MappingStore, MemoryStore, SnesButton, StoreError,
};

/// Backend whose contents stay inspectable after being moved into a store.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.borrow_mut().set(key, value)
    }
}

/// Backend that fails every operation.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }
}

fn seeded(key: &str, value: &str) -> MappingStore {
    let mut backend = MemoryStore::new();
    backend.set(key, value.to_string()).unwrap();
    MappingStore::new(backend)
}

#[test]
fn test_load_without_stored_data_is_default() {
    let store = MappingStore::in_memory();
    assert_eq!(store.load("Unknown Pad"), ButtonMapping::new());
}

#[test]
fn test_load_corrupted_data_is_default() {
    for corrupt in ["", "{", "42", "\"B\"", "[]", "null", r#"{"B": true}"#, r#"{"Jump": 1}"#] {
        let store = seeded("pad", corrupt);
        assert_eq!(store.load("pad"), ButtonMapping::new(), "record {corrupt:?}");
    }
}

#[test]
fn test_load_reads_legacy_record() {
    // Record as written by earlier front-ends: every name, -1 for ignored,
    // and an "Ignore" entry left behind when a host button was set to Ignore
    let record = r#"{"B":0,"Y":1,"Select":2,"Start":3,"Up":4,"Down":5,"Left":6,"Right":7,
        "A":0,"X":9,"L":10,"R":11,"Unused1":13,"Unused2":12,"Unused3":-1,"Unused4":15,
        "Ignore":5}"#;
    let mapping = seeded("pad", record).load("pad");
    assert_eq!(mapping.host_index(SnesButton::A), Some(0));
    assert_eq!(mapping.host_index(SnesButton::Down), Some(5));
    assert_eq!(mapping.host_index(SnesButton::Unused1), Some(13));
    assert_eq!(mapping.host_index(SnesButton::Unused2), Some(12));
    assert_eq!(mapping.host_index(SnesButton::Unused3), None);
}

#[test]
fn test_save_then_load_round_trips() {
    let mut store = MappingStore::in_memory();

    let mut ignored = ButtonMapping::unmapped();
    ignored.set(SnesButton::Start, Some(7));
    let mut mirrored = ButtonMapping::new();
    mirrored.set(SnesButton::L, Some(0));
    mirrored.set(SnesButton::R, Some(0));
    let mut wide = ButtonMapping::new();
    wide.set(SnesButton::Unused4, Some(255));

    for mapping in [ButtonMapping::new(), ignored, mirrored, wide] {
        store.save("pad", &mapping).unwrap();
        assert_eq!(store.load("pad"), mapping);
        assert_eq!(store.working("pad"), mapping);
    }
}

#[test]
fn test_save_replaces_whole_record() {
    let backend = SharedStore::default();
    let mut store = MappingStore::new(backend.clone());

    let mut first = ButtonMapping::new();
    first.set(SnesButton::Y, None);
    store.save("pad", &first).unwrap();

    store.save("pad", &ButtonMapping::new()).unwrap();
    let record = backend.get("pad").unwrap().unwrap();
    assert_eq!(ButtonMapping::from_record(&record).unwrap(), ButtonMapping::new());
}

#[test]
fn test_devices_are_independent() {
    let mut store = MappingStore::in_memory();
    store.set("Pad One", SnesButton::B, Some(5));
    store.save_working("Pad One").unwrap();

    assert_eq!(store.load("Pad Two"), ButtonMapping::new());
    assert_eq!(store.working("Pad Two"), ButtonMapping::new());
    assert_eq!(store.load("Pad One").host_index(SnesButton::B), Some(5));
}

#[test]
fn test_set_is_last_write_wins() {
    let mut store = MappingStore::in_memory();
    store.set("pad", SnesButton::A, Some(1));
    store.set("pad", SnesButton::A, Some(2));
    assert_eq!(store.working("pad").host_index(SnesButton::A), Some(2));
}

#[test]
fn test_snapshot_is_not_affected_by_later_edits() {
    let mut store = MappingStore::in_memory();
    let handle = store.handle("pad");
    let before = handle.snapshot();
    store.set("pad", SnesButton::A, None);
    assert_eq!(before, ButtonMapping::new());
    assert_eq!(handle.snapshot().host_index(SnesButton::A), None);
}

#[test]
fn test_backend_failures() {
    let mut store = MappingStore::new(BrokenStore);
    assert_eq!(store.load("pad"), ButtonMapping::new());
    assert!(matches!(
        store.save("pad", &ButtonMapping::new()),
        Err(StoreError::Io(_))
    ));
}

#[test]
fn test_failed_save_keeps_working_mapping() {
    let mut store = MappingStore::new(BrokenStore);
    store.set("pad", SnesButton::X, Some(3));
    let mut other = ButtonMapping::new();
    other.set(SnesButton::X, Some(4));
    assert!(store.save("pad", &other).is_err());
    assert_eq!(store.working("pad").host_index(SnesButton::X), Some(3));
}
