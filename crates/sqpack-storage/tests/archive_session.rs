//! End-to-end archive sessions over synthetic index and data files

#![allow(clippy::expect_used, clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use sqpack_formats::hash::path_hash;
use sqpack_storage::{Archive, ArchiveConfig, StorageError, candidates};
use sqpack_test_utils::{ArchiveBuilder, EntryBuilder, IndexFileBuilder};
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    archive: Archive,
}

fn fixture(build: impl FnOnce(ArchiveBuilder) -> ArchiveBuilder) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let sqpack = dir.path().join("sqpack");
    std::fs::create_dir_all(&sqpack).unwrap();
    let index_path = build(ArchiveBuilder::new("060000.win32"))
        .write_to(&sqpack)
        .unwrap();

    let config = ArchiveConfig::new(index_path)
        .with_work_dir(dir.path().join("data"))
        .with_extract_dir(dir.path().join("extract"));
    let archive = Archive::open(config).unwrap();
    Fixture { _dir: dir, archive }
}

fn icon_fixture() -> Fixture {
    fixture(|b| {
        b.file("ui/icon/000000/000001.tex", b"icon one")
            .file("ui/icon/000000/000002.tex", b"icon two")
            .file("ui/uld/unknown.uld", b"never guessed")
    })
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_icon_scenario() {
    let fx = icon_fixture();
    let config = fx.archive.config().clone();

    let report = fx
        .archive
        .brute_force(["ui/icon/000000/000001.tex", "ui/icon/000000/000003.tex"])
        .await
        .unwrap();

    assert_eq!(report.found, vec!["ui/icon/000000/000001.tex".to_string()]);
    assert_eq!(report.remaining, 2);
    assert_eq!(read(&config.results_path()), "ui/icon/000000/000001.tex\n");

    let snapshot: serde_json::Value =
        serde_json::from_str(&read(&config.snapshot_path())).unwrap();
    let bucket = &snapshot[path_hash("ui/icon/000000").to_string()];
    assert!(bucket.get(path_hash("000001.tex").to_string()).is_none());
    assert!(bucket.get(path_hash("000002.tex").to_string()).is_some());
}

#[tokio::test]
async fn test_single_record_resolves_and_stops() {
    let fx = fixture(|b| b.file("ui/icon/000000/000000.tex", b"only icon"));
    let config = fx.archive.config().clone();

    let report = fx.archive.brute_force(candidates::ui_icons()).await.unwrap();

    assert_eq!(report.found, vec!["ui/icon/000000/000000.tex".to_string()]);
    assert_eq!(report.remaining, 0);
    assert_eq!(report.confirmed, 1);
    // The first generated candidate empties the store
    assert_eq!(report.tested, 1);
    assert!(!report.interrupted);

    assert_eq!(read(&config.results_path()), "ui/icon/000000/000000.tex\n");
    let snapshot: serde_json::Value =
        serde_json::from_str(&read(&config.snapshot_path())).unwrap();
    assert_eq!(snapshot, serde_json::json!({}));
    assert!(fx.archive.load_lookup().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_runs_are_monotonic_and_idempotent() {
    let fx = icon_fixture();
    let config = fx.archive.config().clone();

    let first = fx.archive.brute_force(candidates::ui_icons().take(10)).await.unwrap();
    assert_eq!(first.found.len(), 2);
    assert_eq!(first.remaining, 1);
    let snapshot_after_first = read(&config.snapshot_path());
    let results_after_first = read(&config.results_path());

    let second = fx.archive.brute_force(candidates::ui_icons().take(10)).await.unwrap();
    assert!(second.found.is_empty());
    assert_eq!(second.remaining, 1);
    assert_eq!(second.confirmed, 2);
    assert_eq!(read(&config.snapshot_path()), snapshot_after_first);
    assert_eq!(read(&config.results_path()), results_after_first);
}

#[tokio::test]
async fn test_empty_run_persists_nothing() {
    let fx = icon_fixture();
    let config = fx.archive.config().clone();

    let report = fx.archive.brute_force(["ui/icon/999000/999999.tex", "bad"]).await.unwrap();
    assert!(report.found.is_empty());
    assert_eq!(report.invalid, vec!["bad".to_string()]);
    assert!(!config.snapshot_path().exists());
    assert!(!config.results_path().exists());
}

#[tokio::test]
async fn test_results_merge_across_runs() {
    let fx = icon_fixture();
    let config = fx.archive.config().clone();

    fx.archive.brute_force(["ui/icon/000000/000002.tex"]).await.unwrap();
    let report = fx
        .archive
        .brute_force(["ui/icon/000000/000001.tex"])
        .await
        .unwrap();

    assert_eq!(report.confirmed, 2);
    assert_eq!(
        read(&config.results_path()),
        "ui/icon/000000/000001.tex\nui/icon/000000/000002.tex\n"
    );
}

#[tokio::test]
async fn test_lookup_uses_fresh_index() {
    let fx = icon_fixture();
    fx.archive.brute_force(["ui/icon/000000/000001.tex"]).await.unwrap();

    // Resolved entries are gone from the snapshot but not from the index
    let found = fx.archive.lookup("ui/icon/000000/000001.tex").await.unwrap();
    assert!(found.location.is_some());
    assert_eq!(found.path_hash, path_hash("ui/icon/000000"));

    let missing = fx.archive.lookup("ui/icon/000000/000009.tex").await.unwrap();
    assert!(missing.location.is_none());
}

#[tokio::test]
async fn test_extract_confirmed() {
    let fx = icon_fixture();
    let config = fx.archive.config().clone();
    fx.archive
        .brute_force(["ui/icon/000000/000001.tex", "ui/icon/000000/000002.tex"])
        .await
        .unwrap();

    let report = fx.archive.extract_confirmed().await.unwrap();
    assert_eq!(report.extracted.len(), 2);
    assert!(report.failed.is_empty());

    let written = config.extract_dir.join("ui/icon/000000/000002.tex");
    assert_eq!(std::fs::read(written).unwrap(), b"icon two".to_vec());
}

#[tokio::test]
async fn test_extract_single_and_not_found() {
    let fx = icon_fixture();

    let written = fx.archive.extract("ui/uld/unknown.uld").await.unwrap();
    assert_eq!(std::fs::read(written).unwrap(), b"never guessed".to_vec());

    let err = fx.archive.extract("ui/uld/other.uld").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_extract_collects_per_item_failures() {
    let placeholder = EntryBuilder::placeholder().build();
    let fx = fixture(|b| {
        b.file("common/a.txt", b"alpha")
            .entry("common/empty.txt", &placeholder)
    });
    let config = fx.archive.config().clone();

    // A confirmed path that is not in the index also fails on its own
    std::fs::create_dir_all(&config.work_dir).unwrap();
    std::fs::write(
        config.results_path(),
        "common/a.txt\ncommon/empty.txt\ncommon/gone.txt\n",
    )
    .unwrap();

    let report = fx.archive.extract_confirmed().await.unwrap();
    assert_eq!(report.extracted.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert!(matches!(report.failed[0].1, StorageError::Decode(_)));
    assert!(matches!(report.failed[1].1, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_content_type_is_decode_error() {
    let odd = EntryBuilder::placeholder().content_type(7).build();
    let fx = fixture(|b| b.entry("common/odd.bin", &odd));

    let err = fx.archive.read_entry("common/odd.bin").await.unwrap_err();
    assert!(matches!(err, StorageError::Decode(ref m) if m.contains("content type 7")));
}

#[tokio::test]
async fn test_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = ArchiveBuilder::new("040000.win32")
        .file("chara/a/b.mtrl", b"x")
        .write_index_only(dir.path())
        .unwrap();
    let archive = Archive::open(ArchiveConfig::new(index_path)).unwrap();

    let err = archive.read_entry("chara/a/b.mtrl").await.unwrap_err();
    match err {
        StorageError::MissingResource(path) => {
            assert_eq!(path, dir.path().join("040000.win32.dat0"));
        }
        other => unreachable!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn test_corrupted_index_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let builder = IndexFileBuilder::new()
        .file("ui/icon/000000/000001.tex", 0x80)
        .segment_payload(3, b"third".to_vec());
    let mut bytes = builder.build();
    let (offset, _) = builder.segment_range(3);
    bytes[offset] ^= 0xFF;
    let index_path = dir.path().join("060000.win32.index");
    std::fs::write(&index_path, bytes).unwrap();

    let archive = Archive::open(
        ArchiveConfig::new(&index_path).with_work_dir(dir.path().join("data")),
    )
    .unwrap();

    let err = archive.brute_force(["ui/icon/000000/000001.tex"]).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, StorageError::Integrity { segment: 3, .. }));
    assert!(!dir.path().join("data").exists());
}

#[tokio::test]
async fn test_export_sql() {
    let fx = icon_fixture();
    fx.archive
        .brute_force(["ui/icon/000000/000001.tex", "ui/icon/000000/000002.tex"])
        .await
        .unwrap();

    let path = fx.archive.export_sql().await.unwrap();
    let sql = read(&path);
    assert!(sql.starts_with("BEGIN TRANSACTION;\n"));
    assert!(sql.ends_with("COMMIT;\n"));
    assert!(sql.contains("\"ui/icon/000000\", 0, 60000, 8);"));
    assert!(sql.contains("\"000001.tex\", 0, 60000, 8),"));
    assert!(sql.contains("\"000002.tex\", 0, 60000, 8);"));
}
