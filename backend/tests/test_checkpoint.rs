//! Tests for per-station checkpoint files and the run manifest

use station_udf_core_rs::orchestrator::{
    CheckpointError, CheckpointStore, ManifestStatus, MANIFEST_FILE,
};
use station_udf_core_rs::UdfConfig;
use std::fs;
use tempfile::TempDir;

fn store() -> (TempDir, CheckpointStore) {
    let dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(dir.path().join("intermediate"));
    store.prepare().unwrap();
    (dir, store)
}

#[test]
fn test_write_then_load() {
    let (_dir, store) = store();
    let udf = vec![12.5, 3.25, 0.1 + 0.2, 7.0e-12];

    assert!(!store.exists("HB101"));
    let path = store.write("HB101", &udf).unwrap();

    assert!(store.exists("HB101"));
    assert_eq!(path, store.path_for("HB101"));
    assert_eq!(store.load("HB101").unwrap(), udf);

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("inventory,udf\n0,12.5\n"), "{}", contents);
}

#[test]
fn test_no_temporary_file_left_behind() {
    let (_dir, store) = store();
    store.write("S1", &[1.0, 2.0]).unwrap();

    let names: Vec<String> = fs::read_dir(store.dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["S1.csv".to_string()]);
}

#[test]
fn test_refuses_overwrite() {
    let (_dir, store) = store();
    store.write("S1", &[1.0]).unwrap();

    let err = store.write("S1", &[2.0]).unwrap_err();
    assert!(matches!(err, CheckpointError::AlreadyExists(_)));
    assert_eq!(store.load("S1").unwrap(), vec![1.0]);
}

#[test]
fn test_empty_table_round_trips() {
    let (_dir, store) = store();
    store.write("EMPTY", &[]).unwrap();
    assert!(store.load("EMPTY").unwrap().is_empty());
}

#[test]
fn test_gap_in_inventories_is_malformed() {
    let (_dir, store) = store();
    fs::write(store.path_for("GAP"), "inventory,udf\n0,1.0\n2,3.0\n").unwrap();

    assert!(matches!(
        store.load("GAP"),
        Err(CheckpointError::Malformed { .. })
    ));
}

#[test]
fn test_wrong_header_is_malformed() {
    let (_dir, store) = store();
    fs::write(store.path_for("HDR"), "level,cost\n0,1.0\n").unwrap();

    assert!(matches!(
        store.load("HDR"),
        Err(CheckpointError::Malformed { .. })
    ));
}

#[test]
fn test_unparseable_value_is_csv_error() {
    let (_dir, store) = store();
    fs::write(store.path_for("BAD"), "inventory,udf\n0,abc\n").unwrap();

    assert!(matches!(store.load("BAD"), Err(CheckpointError::Csv { .. })));
}

#[test]
fn test_sanitized_ids_stay_inside_directory() {
    let (_dir, store) = store();
    let path = store.write("../escape/attempt", &[1.0]).unwrap();

    assert_eq!(path.parent().unwrap(), store.dir());
    assert!(store.exists("../escape/attempt"));
    assert_eq!(store.load("../escape/attempt").unwrap(), vec![1.0]);
}

#[test]
fn test_manifest_created_then_matched() {
    let (_dir, store) = store();
    let config = UdfConfig::default();

    assert_eq!(store.ensure_manifest(&config).unwrap(), ManifestStatus::Created);
    assert!(store.dir().join(MANIFEST_FILE).is_file());
    assert_eq!(store.ensure_manifest(&config).unwrap(), ManifestStatus::Matched);
}

#[test]
fn test_manifest_rejects_other_config() {
    let (_dir, store) = store();
    store.ensure_manifest(&UdfConfig::default()).unwrap();

    let err = store
        .ensure_manifest(&UdfConfig::with_discretization(15.0))
        .unwrap_err();
    assert!(matches!(err, CheckpointError::ConfigMismatch { .. }));
}

#[test]
fn test_corrupt_manifest_is_malformed() {
    let (_dir, store) = store();
    fs::write(store.dir().join(MANIFEST_FILE), "{not json").unwrap();

    assert!(matches!(
        store.ensure_manifest(&UdfConfig::default()),
        Err(CheckpointError::Malformed { .. })
    ));
}
