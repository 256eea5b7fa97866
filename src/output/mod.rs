//! Writing the tracker table with timestamped backups.
//!
//! The destination path is a pointer to the latest timestamped version in
//! the backups directory. A save is skipped entirely when the rendered
//! table is identical to what the destination already holds, so repeated
//! runs on unchanged inputs leave the dataset untouched.

use std::fs;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use chrono::Local;

use crate::error::{Result, TrackerError};
use crate::reader::{delimiter_for_path, render_delimited};

/// What a save attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The destination already held identical content; nothing was written
    Unchanged,
    /// A new version was written to the returned backup path
    Written(PathBuf),
}

/// Save a record batch to `destination`, keeping timestamped versions in
/// `backups_dir`
///
/// # Errors
/// Returns an error if rendering or any filesystem operation fails
pub fn save_with_backup(
    batch: &RecordBatch,
    destination: &Path,
    backups_dir: &Path,
) -> Result<SaveOutcome> {
    let rendered = render_delimited(batch, delimiter_for_path(destination))?;

    if destination.exists() {
        let existing = fs::read_to_string(destination)?;
        if existing == rendered {
            log::info!(
                "No changes to {}. Will not write new file.",
                destination.display()
            );
            return Ok(SaveOutcome::Unchanged);
        }
    }

    fs::create_dir_all(backups_dir)?;
    let stem = destination
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            TrackerError::config(format!(
                "output path {} has no usable file name",
                destination.display()
            ))
        })?;
    let extension = destination
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let timestamp = Local::now().format("%Y%m%d_%H%M");
    let backup = backups_dir.join(format!("{stem}-{timestamp}{extension}"));

    fs::write(&backup, &rendered)?;
    let backup = backup.canonicalize()?;
    point_destination(&backup, destination)?;
    log::info!("Saved table to {}", backup.display());
    Ok(SaveOutcome::Written(backup))
}

/// Point the destination path at the latest backup
fn point_destination(backup: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    if destination.exists() || destination.is_symlink() {
        fs::remove_file(destination)?;
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(backup, destination)?;
    #[cfg(not(unix))]
    fs::copy(backup, destination)?;
    Ok(())
}
