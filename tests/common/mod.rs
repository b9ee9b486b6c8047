#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ddcutils_test_utils::IniBuilder;

/// The settings file most config tests start from.
pub fn settings_ini() -> IniBuilder {
    IniBuilder::new()
        .comment("application settings")
        .section("main")
        .entry("files", "file1.txt,file2.txt")
        .entry("path_logs", "/tmp/logs")
        .entry("numbers", "1,2,3,4,5")
        .entry("mixed", "a, 2,b")
        .entry("retries", "3")
        .entry("empty", "")
        .bare("flag")
        .section("Database Credentials")
        .entry("host", "localhost")
        .entry("port", "5432")
        .entry("url", "postgres://${host}:${port}/app")
}

pub fn write_settings(dir: &Path) -> PathBuf {
    settings_ini()
        .write_to(dir, "settings.ini")
        .expect("write settings fixture")
}
