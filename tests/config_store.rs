// tests/config_store.rs

mod common;

use ddcutils::config::{ConfigStore, ConfigValues, Item, Value};
use ddcutils::errors::{ENOENT, UtilError};
use ddcutils_test_utils::{IniBuilder, init_tracing};
use tempfile::tempdir;

use common::write_settings;

fn ints(ns: &[i64]) -> Value {
    Value::List(ns.iter().map(|n| Item::Int(*n)).collect())
}

#[test]
fn read_all_flattened() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path());

    let all = ConfigStore::new().read_all(&path, true).unwrap();
    let flat = all.as_flat().unwrap();

    assert_eq!(flat["main.numbers"], ints(&[1, 2, 3, 4, 5]));
    assert_eq!(flat["main.retries"], Value::Int(3));
    assert_eq!(flat["main.empty"], Value::Absent);
    assert_eq!(flat["main.flag"], Value::Absent);
    assert_eq!(flat["main.path_logs"], Value::from("/tmp/logs"));
    assert_eq!(flat["Database_Credentials.port"], Value::Int(5432));
    assert_eq!(
        flat["Database_Credentials.url"],
        Value::from("postgres://localhost:5432/app")
    );
}

#[test]
fn read_all_nested_serializes_to_json() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path());

    let all = ConfigStore::new().read_all(&path, false).unwrap();
    assert!(matches!(all, ConfigValues::Nested(_)));

    let json = serde_json::to_value(&all).unwrap();
    assert_eq!(json["main"]["files"], serde_json::json!(["file1.txt", "file2.txt"]));
    assert_eq!(json["main"]["mixed"], serde_json::json!(["a", 2, "b"]));
    assert_eq!(json["main"]["empty"], serde_json::Value::Null);
    assert_eq!(json["Database_Credentials"]["host"], "localhost");
}

#[test]
fn read_section_and_value() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path());
    let store = ConfigStore::new();

    let main = store.read_section(&path, "main").unwrap();
    assert_eq!(
        main["files"],
        Value::List(vec![Item::from("file1.txt"), Item::from("file2.txt")])
    );

    assert_eq!(store.read_value(&path, "main", "retries").unwrap(), Value::Int(3));
    assert_eq!(store.read_value(&path, "main", "nope").unwrap(), Value::Absent);
}

#[test]
fn quoted_write_reads_back_as_list() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path());
    let store = ConfigStore::new();

    assert!(store.write_value(&path, "main", "numbers", "1,2,3", true).unwrap());
    assert_eq!(store.read_value(&path, "main", "numbers").unwrap(), ints(&[1, 2, 3]));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("numbers=\"1,2,3\"\n"), "{text}");
}

#[test]
fn repeated_writes_are_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path());
    let store = ConfigStore::new();

    store.write_value(&path, "main", "retries", 9, false).unwrap();
    let once = std::fs::read_to_string(&path).unwrap();
    store.write_value(&path, "main", "retries", 9, false).unwrap();
    let twice = std::fs::read_to_string(&path).unwrap();

    assert_eq!(once, twice);
    // Comments do not survive a rewrite; entries do.
    assert!(!once.contains("application settings"));
    assert!(once.contains("[Database Credentials]\nhost=localhost\n"));
}

#[test]
fn duplicate_option_refuses_write() {
    let dir = tempdir().unwrap();
    let path = IniBuilder::new()
        .section("a")
        .entry("k", "1")
        .entry("k", "2")
        .write_to(dir.path(), "dup.ini")
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    assert!(!ConfigStore::new().write_value(&path, "a", "k", 3, false).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn missing_file_reports_enoent_everywhere() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("unknown.ini");
    let store = ConfigStore::new();

    let errors = [
        store.read_all(&missing, true).unwrap_err(),
        store.read_section(&missing, "main").unwrap_err(),
        store.read_value(&missing, "main", "k").unwrap_err(),
        store.write_value(&missing, "main", "k", "v", false).unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, UtilError::NotFound(_)));
        assert_eq!(err.errno(), Some(ENOENT));
        assert_eq!(err.strerror(), Some("No such file or directory"));
        assert!(err.to_string().contains("unknown.ini"));
    }
}

#[test]
fn continuation_lines_join_with_newlines() {
    let dir = tempdir().unwrap();
    let path = IniBuilder::new()
        .section("text")
        .entry("motd", "hello")
        .raw("    world")
        .write_to(dir.path(), "motd.ini")
        .unwrap();

    let store = ConfigStore::new();
    assert_eq!(
        store.read_value(&path, "text", "motd").unwrap(),
        Value::from("hello\nworld")
    );

    // Rewriting keeps the multi-line value readable.
    store.write_value(&path, "text", "other", 1, false).unwrap();
    assert_eq!(
        store.read_value(&path, "text", "motd").unwrap(),
        Value::from("hello\nworld")
    );
}
