//! Idempotent transfer planning for bulk archive downloads.
//!
//! A links file lists one download source per line. Each file is probed at
//! the destination first: anything already present is skipped, never
//! overwritten. Probe failures abort the run; fetch failures are recorded
//! per file so one bad link does not waste an otherwise good batch.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};
use crate::utils::logging::create_progress_bar;

/// Destination backend for transfers
///
/// The download portal and any remote staging host live behind this seam;
/// the planner itself only decides what to skip and what to fetch.
pub trait Transport {
    /// Whether a file with this name is already present at the destination
    ///
    /// # Errors
    /// A probe failure is unrecoverable and aborts the whole run
    fn exists(&self, name: &str) -> Result<bool>;

    /// Fetch one source into the destination under the given name
    fn fetch(&self, source: &str, name: &str) -> Result<()>;
}

/// Transport writing into a local directory (fetch is a filesystem copy;
/// `file://` prefixes on sources are accepted)
#[derive(Debug, Clone)]
pub struct LocalDirTransport {
    destination: PathBuf,
}

impl LocalDirTransport {
    /// Create a transport targeting the given directory
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }
}

impl Transport for LocalDirTransport {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.destination.join(name).exists())
    }

    fn fetch(&self, source: &str, name: &str) -> Result<()> {
        let source = source.strip_prefix("file://").unwrap_or(source);
        let source = Path::new(source);
        if !source.exists() {
            return Err(TrackerError::file_not_found(source));
        }
        fs::create_dir_all(&self.destination)?;
        fs::copy(source, self.destination.join(name))?;
        Ok(())
    }
}

/// Per-file outcome of a transfer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// The file was already present at the destination
    Skipped,
    /// The file was fetched successfully
    Transferred,
    /// The fetch failed with the recorded reason
    Failed(String),
}

/// One planned file with its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    /// The source link as given in the links file
    pub source: String,
    /// Target filename at the destination
    pub name: String,
    /// What happened to this file
    pub status: TransferStatus,
}

/// Parse a links file body: one source per line, blank lines and `#`
/// comments ignored
#[must_use]
pub fn parse_links(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Read and parse a links file
pub fn read_links_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(TrackerError::file_not_found(path));
    }
    let text = fs::read_to_string(path)?;
    Ok(parse_links(&text))
}

/// Target filename for a source link: its final path segment, without any
/// query suffix
pub fn target_name(link: &str) -> Result<String> {
    let name = link.rsplit('/').next().unwrap_or(link);
    let name = name.split('?').next().unwrap_or(name);
    if name.is_empty() {
        return Err(TrackerError::format_err(format!(
            "cannot derive a target filename from link {link:?}"
        )));
    }
    Ok(name.to_string())
}

/// Fetch every link whose target is not yet at the destination
///
/// Files already present are skipped (never overwritten). A failed fetch
/// is recorded in the result and the run continues with the next link.
///
/// # Errors
/// Returns an error when a link has no usable filename or an existence
/// probe fails
pub fn fetch_missing(links: &[String], transport: &dyn Transport) -> Result<Vec<FileTransfer>> {
    let progress = create_progress_bar(links.len() as u64, Some("checking downloads"));
    let mut results = Vec::with_capacity(links.len());

    for link in links {
        let name = target_name(link)?;
        let status = if transport.exists(&name)? {
            log::info!("{name} already exists at destination. Not downloading");
            TransferStatus::Skipped
        } else {
            match transport.fetch(link, &name) {
                Ok(()) => {
                    log::info!("Transferred {name}");
                    TransferStatus::Transferred
                }
                Err(e) => {
                    log::error!("Failed to transfer {name}: {e}");
                    TransferStatus::Failed(e.to_string())
                }
            }
        };
        results.push(FileTransfer {
            source: link.clone(),
            name,
            status,
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_parsing_skips_blanks_and_comments() {
        let links = parse_links("# archives\nhttps://host/a.zip\n\n  https://host/b.zip  \n");
        assert_eq!(links, vec!["https://host/a.zip", "https://host/b.zip"]);
    }

    #[test]
    fn target_name_takes_the_final_segment() {
        assert_eq!(target_name("https://host/path/a.zip").unwrap(), "a.zip");
        assert_eq!(target_name("a.zip").unwrap(), "a.zip");
        assert_eq!(target_name("https://host/a.zip?token=x").unwrap(), "a.zip");
    }

    #[test]
    fn trailing_slash_has_no_filename() {
        assert!(target_name("https://host/path/").is_err());
    }
}
