// tests/log_rotation.rs

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ddcutils::fs::{FileSystem, RealFileSystem};
use ddcutils::logging::{
    GzipRotator, LogPolicy, RotatingFileWriter, RotatingLog, RotationTrigger, Severity, When,
};
use ddcutils_test_utils::{age_file, files_ending_with, write_filler};
use flate2::read::GzDecoder;
use tempfile::tempdir;

fn real_fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem)
}

fn size_writer(dir: &Path, max_bytes: u64, retention_days: u32) -> RotatingFileWriter {
    let rotator = GzipRotator::new(real_fs(), dir, retention_days);
    RotatingFileWriter::open(
        dir.join("app.log"),
        &RotationTrigger::Size { max_bytes },
        Box::new(rotator),
        real_fs(),
    )
    .unwrap()
}

fn gunzip(path: &Path) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(std::fs::File::open(path).unwrap())
        .read_to_end(&mut out)
        .unwrap();
    out
}

#[test]
fn oversized_active_file_rotates_on_next_write() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write_filler(&active, 5 * 1024 * 1024).unwrap();

    let mut writer = size_writer(dir.path(), 1, 7);
    writer.write_all(b"fresh record\n").unwrap();
    writer.flush().unwrap();

    let archive = dir.path().join("app_1.log.gz");
    assert!(archive.is_file());
    assert_eq!(gunzip(&archive).len(), 5 * 1024 * 1024);
    // The new record starts a fresh file.
    assert_eq!(std::fs::read_to_string(&active).unwrap(), "fresh record\n");
}

#[test]
fn sequence_numbers_skip_existing_archives() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("app_3.log.gz"), b"older").unwrap();
    write_filler(dir.path().join("app.log"), 64).unwrap();

    let mut writer = size_writer(dir.path(), 32, 7);
    writer.write_all(b"x\n").unwrap();

    assert_eq!(
        files_ending_with(dir.path(), ".gz").unwrap(),
        vec!["app_3.log.gz", "app_4.log.gz"]
    );
}

#[test]
fn size_rotation_ignores_date_stamped_archives() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("app_20240103.log.gz"), b"by date").unwrap();
    write_filler(dir.path().join("app.log"), 64).unwrap();

    let mut writer = size_writer(dir.path(), 32, 7);
    writer.write_all(b"x\n").unwrap();

    assert_eq!(
        files_ending_with(dir.path(), ".gz").unwrap(),
        vec!["app_1.log.gz", "app_20240103.log.gz"]
    );
}

#[test]
fn rotation_prunes_archives_past_retention() {
    let dir = tempdir().unwrap();
    let stale = dir.path().join("archive_20200101.log.gz");
    let recent = dir.path().join("app_1.log.gz");
    let unrelated = dir.path().join("notes.txt");
    for path in [&stale, &recent, &unrelated] {
        std::fs::write(path, b"data").unwrap();
    }
    age_file(&stale, 30).unwrap();
    age_file(&recent, 2).unwrap();
    age_file(&unrelated, 30).unwrap();
    write_filler(dir.path().join("app.log"), 128).unwrap();

    let mut writer = size_writer(dir.path(), 64, 7);
    writer.write_all(b"trigger\n").unwrap();

    assert!(!stale.exists());
    assert!(recent.exists());
    assert!(unrelated.exists());
    assert!(dir.path().join("app_2.log.gz").is_file());
}

#[test]
fn stale_time_rotated_log_rolls_on_first_write() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    std::fs::write(&active, b"yesterday's news\n").unwrap();
    age_file(&active, 3).unwrap();

    let mtime: DateTime<Utc> = std::fs::metadata(&active).unwrap().modified().unwrap().into();
    let expected = format!("app_{}.log.gz", mtime.format("%Y%m%d"));

    let rotator = GzipRotator::new(real_fs(), dir.path(), 7);
    let mut writer = RotatingFileWriter::open(
        &active,
        &RotationTrigger::time(When::Midnight),
        Box::new(rotator),
        real_fs(),
    )
    .unwrap();
    writer.write_all(b"today\n").unwrap();

    assert_eq!(files_ending_with(dir.path(), ".gz").unwrap(), vec![expected.clone()]);
    assert_eq!(gunzip(&dir.path().join(expected)), b"yesterday's news\n");
    assert_eq!(std::fs::read_to_string(&active).unwrap(), "today\n");
}

#[test]
fn fresh_time_rotated_log_does_not_roll() {
    let dir = tempdir().unwrap();
    let rotator = GzipRotator::new(real_fs(), dir.path(), 7);
    let mut writer = RotatingFileWriter::open(
        dir.path().join("app.log"),
        &RotationTrigger::time(When::Hours),
        Box::new(rotator),
        real_fs(),
    )
    .unwrap();
    writer.write_all(b"a\n").unwrap();
    writer.write_all(b"b\n").unwrap();

    assert!(files_ending_with(dir.path(), ".gz").unwrap().is_empty());
}

#[test]
fn subscriber_writes_formatted_lines_and_rotates() {
    let dir = tempdir().unwrap();
    let policy = LogPolicy::sized(dir.path().join("logs"), "svc.log")
        .with_severity(Severity::Info)
        .with_trigger(RotationTrigger::Size { max_bytes: 200 });
    let (handle, subscriber) = RotatingLog::new(policy).build().unwrap();

    tracing::subscriber::with_default(subscriber, || {
        for i in 0..10 {
            tracing::info!(i, "service heartbeat");
        }
        tracing::debug!("filtered out");
    });
    handle.flush().unwrap();

    let logs = dir.path().join("logs");
    let archives = files_ending_with(&logs, ".log.gz").unwrap();
    assert!(!archives.is_empty());
    assert!(archives.iter().all(|a| a.starts_with("svc_")));

    let active = std::fs::read_to_string(handle.path()).unwrap();
    assert!(active.contains("]:[INFO]:service heartbeat i=9"), "{active:?}");
    assert!(!active.contains("filtered out"));
}

#[test]
fn policy_file_drives_the_logger() {
    let dir = tempdir().unwrap();
    let policy_path = dir.path().join("logging.toml");
    let log_dir = dir.path().join("out");
    std::fs::write(
        &policy_path,
        format!(
            "directory = {:?}\nfilename = \"tool.log\"\nretention_days = 2\n\n[trigger]\nkind = \"time\"\nwhen = \"H\"\n",
            log_dir.display().to_string()
        ),
    )
    .unwrap();

    let policy = ddcutils::logging::load_policy(&policy_path).unwrap();
    assert_eq!(policy.retention_days, 2);
    let (handle, _subscriber) = RotatingLog::new(policy).build().unwrap();
    assert_eq!(handle.path(), log_dir.join("tool.log"));
    assert!(handle.path().is_file());
}
