//! Integration tests for the sqpack binary

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use sqpack_test_utils::{ArchiveBuilder, IndexFileBuilder};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sample_archive() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let index = ArchiveBuilder::new("060000.win32")
        .file("ui/loadingimage/-nowloading_base.tex", b"base")
        .file("ui/loadingimage/-nowloading_base07.tex", b"seven")
        .file("ui/uld/secret.uld", b"hidden")
        .write_to(dir.path())
        .unwrap();
    (dir, index)
}

fn sqpack(work_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sqpack").unwrap();
    cmd.env("SQPACK_WORK_DIR", work_dir);
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("sqpack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("brute-force"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_verify() {
    let (dir, index) = sample_archive();
    sqpack(&dir.path().join("data"))
        .arg("verify")
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 files in 2 directories"));
}

#[test]
fn test_verify_corrupted_index_exits_with_integrity_code() {
    let dir = tempfile::tempdir().unwrap();
    let builder = IndexFileBuilder::new().file("a/b", 0x80);
    let mut bytes = builder.build();
    let (offset, _) = builder.segment_range(1);
    bytes[offset] ^= 0x01;
    let index = dir.path().join("000000.win32.index");
    std::fs::write(&index, bytes).unwrap();

    sqpack(&dir.path().join("data"))
        .arg("verify")
        .arg(&index)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Integrity check failed for segment 1"));
}

#[test]
fn test_brute_force_generator_then_extract() {
    let (dir, index) = sample_archive();
    let work = dir.path().join("data");
    let out = dir.path().join("out");

    sqpack(&work)
        .args(["brute-force", "--generator", "loading-images"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("ui/loadingimage/-nowloading_base07.tex"));

    let results = std::fs::read_to_string(work.join("060000.win32.index.txt")).unwrap();
    assert_eq!(
        results,
        "ui/loadingimage/-nowloading_base.tex\nui/loadingimage/-nowloading_base07.tex\n"
    );

    sqpack(&work)
        .arg("extract")
        .arg(&index)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(
        std::fs::read(out.join("ui/loadingimage/-nowloading_base07.tex")).unwrap(),
        b"seven".to_vec()
    );
}

#[test]
fn test_brute_force_from_stdin_json() {
    let (dir, index) = sample_archive();

    sqpack(&dir.path().join("data"))
        .args(["--format", "json", "brute-force", "--candidates", "-"])
        .arg(&index)
        .write_stdin("UI/ULD/Secret.uld\nnot-a-path\nui/uld/other.uld\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"found\":[\"ui/uld/secret.uld\"]"))
        .stdout(predicate::str::contains("\"invalid\":1"));
}

#[test]
fn test_sql_export() {
    let (dir, index) = sample_archive();
    let work = dir.path().join("data");

    sqpack(&work)
        .args(["brute-force", "--candidates", "-"])
        .arg(&index)
        .write_stdin("ui/uld/secret.uld\n")
        .assert()
        .success();

    sqpack(&work).arg("sql").arg(&index).assert().success();
    let sql = std::fs::read_to_string(work.join("060000.win32.index.sql")).unwrap();
    assert!(sql.contains("\"secret.uld\", 0, 60000, 8);"));
}

#[test]
fn test_lookup_missing_path() {
    let (dir, index) = sample_archive();
    sqpack(&dir.path().join("data"))
        .arg("lookup")
        .arg(&index)
        .arg("ui/uld/nothing.uld")
        .assert()
        .success()
        .stdout(predicate::str::contains("not in index"));
}
