//! Logging and progress-reporting utilities.
//!
//! Standardized operation logging plus progress bars (via the indicatif
//! crate) for the merge and transfer loops.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a step progress bar
pub const DEFAULT_BAR_TEMPLATE: &str =
    "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Log an operation start with consistent format
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
pub fn log_operation_complete(operation: &str, path: &Path, items: usize) {
    log::info!("Successfully {} {} rows from {}", operation, items, path.display());
}

/// Create a progress bar with a standardized style
///
/// # Arguments
/// * `length` - Total length for the progress bar
/// * `description` - Optional description to display as the initial message
#[must_use]
pub fn create_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(DEFAULT_BAR_TEMPLATE)
            .unwrap()
            .progress_chars("#>-"),
    );

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}
