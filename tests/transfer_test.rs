//! Tests for the idempotent transfer planner.

mod common;

use std::fs;

use tempfile::TempDir;

use cohort_tracker::error::{Result, TrackerError};
use cohort_tracker::transfer::{
    FileTransfer, LocalDirTransport, TransferStatus, Transport, fetch_missing, read_links_file,
};

use common::write_file;

fn statuses(results: &[FileTransfer]) -> Vec<&TransferStatus> {
    results.iter().map(|r| &r.status).collect()
}

#[test]
fn files_already_present_are_skipped_without_fetching() {
    let dest = TempDir::new().unwrap();
    write_file(dest.path(), "a.zip", "old a");
    write_file(dest.path(), "b.zip", "old b");

    // The sources are unreachable; any fetch attempt would fail loudly
    let links = vec![
        "https://portal.example.org/archives/a.zip".to_string(),
        "https://portal.example.org/archives/b.zip".to_string(),
    ];
    let transport = LocalDirTransport::new(dest.path());
    let results = fetch_missing(&links, &transport).unwrap();

    assert_eq!(
        statuses(&results),
        vec![&TransferStatus::Skipped, &TransferStatus::Skipped]
    );
    // Existing files are never overwritten
    assert_eq!(fs::read_to_string(dest.path().join("a.zip")).unwrap(), "old a");
    assert_eq!(fs::read_to_string(dest.path().join("b.zip")).unwrap(), "old b");
}

#[test]
fn missing_files_are_fetched_into_the_destination() {
    let source_dir = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let source = write_file(source_dir.path(), "archive.zip", "payload");

    let links = vec![format!("file://{}", source.display())];
    let transport = LocalDirTransport::new(dest.path());
    let results = fetch_missing(&links, &transport).unwrap();

    assert_eq!(statuses(&results), vec![&TransferStatus::Transferred]);
    assert_eq!(
        fs::read_to_string(dest.path().join("archive.zip")).unwrap(),
        "payload"
    );
}

#[test]
fn one_failed_fetch_does_not_stop_the_run() {
    let source_dir = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let good = write_file(source_dir.path(), "good.zip", "payload");

    let links = vec![
        format!("file://{}/absent.zip", source_dir.path().display()),
        format!("file://{}", good.display()),
    ];
    let transport = LocalDirTransport::new(dest.path());
    let results = fetch_missing(&links, &transport).unwrap();

    assert!(matches!(results[0].status, TransferStatus::Failed(_)));
    assert_eq!(results[1].status, TransferStatus::Transferred);
    assert!(dest.path().join("good.zip").exists());
}

#[test]
fn probe_failures_abort_the_whole_run() {
    struct BrokenProbe;
    impl Transport for BrokenProbe {
        fn exists(&self, _name: &str) -> Result<bool> {
            Err(TrackerError::format_err("destination host unreachable"))
        }
        fn fetch(&self, _source: &str, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    let links = vec!["https://portal.example.org/a.zip".to_string()];
    let result = fetch_missing(&links, &BrokenProbe);
    assert!(result.is_err());
}

#[test]
fn links_file_is_read_with_comments_stripped() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "links.txt",
        "# PPMI archives\nhttps://portal.example.org/a.zip\n\nhttps://portal.example.org/b.zip\n",
    );
    let links = read_links_file(&path).unwrap();
    assert_eq!(links.len(), 2);
}

#[test]
fn missing_links_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = read_links_file(&dir.path().join("links.txt"));
    assert!(matches!(result, Err(TrackerError::Io(_))));
}
