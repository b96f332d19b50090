//! File-backed persistence tests.

use axon::store::{self, JsonFileStore, StateStore, KEY_QUEUE, KEY_SETTINGS};
use axon::SyncSettings;

#[test]
fn test_file_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path()).unwrap();

    assert!(store.read(KEY_SETTINGS).is_none());
    store.write(KEY_SETTINGS, r#"{"enabled":false}"#).unwrap();
    assert_eq!(
        store.read(KEY_SETTINGS).as_deref(),
        Some(r#"{"enabled":false}"#)
    );
}

#[test]
fn test_file_store_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("axon");
    let store = JsonFileStore::new(&nested).unwrap();

    store.write(KEY_QUEUE, "[]").unwrap();
    assert!(nested.join(format!("{KEY_QUEUE}.json")).exists());
}

#[test]
fn test_settings_roundtrip_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path()).unwrap();

    let settings = SyncSettings {
        endpoint_url: "http://example.com/ingest".into(),
        max_buffer_size: 42,
        ..SyncSettings::default()
    };
    store::persist(&store, KEY_SETTINGS, &settings);

    let loaded: SyncSettings = store::load_or_default(&store, KEY_SETTINGS);
    assert_eq!(loaded.endpoint_url, "http://example.com/ingest");
    assert_eq!(loaded.max_buffer_size, 42);
}

#[test]
fn test_corrupt_file_loads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path()).unwrap();

    store.write(KEY_SETTINGS, "{truncated").unwrap();
    let loaded: SyncSettings = store::load_or_default(&store, KEY_SETTINGS);
    assert!(loaded.enabled);
    assert_eq!(loaded.max_buffer_size, SyncSettings::default().max_buffer_size);
}
