//! Manifest loading and diagnostic-group filtering.

use std::path::Path;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::{dedup_by_column, filter_record_batch, in_set_mask, value_set};
use crate::reader::read_delimited;
use crate::utils::arrow::require_columns;

use super::{COL_GROUP, COL_PARTICIPANT_ID};

/// Load the participant manifest and keep only the allow-listed groups
///
/// The manifest must carry `participant_id` and `group` columns. One row
/// per participant is kept (first occurrence wins); duplicates are logged.
///
/// # Errors
/// Returns an error if the file is missing or lacks the required columns
pub fn load_manifest(path: &Path, groups: &[String]) -> Result<RecordBatch> {
    let batch = read_delimited(path)?;
    require_columns(&batch, &[COL_PARTICIPANT_ID, COL_GROUP], "manifest")?;

    let rows_before = batch.num_rows();
    let mask = in_set_mask(&batch, COL_GROUP, &value_set(groups))?;
    let filtered = filter_record_batch(&batch, &mask)?;
    log::info!(
        "Kept {} of {} manifest rows after filtering to {} diagnostic group(s)",
        filtered.num_rows(),
        rows_before,
        groups.len()
    );

    let (participants, dropped) = dedup_by_column(&filtered, COL_PARTICIPANT_ID)?;
    if dropped > 0 {
        log::warn!("Dropped {dropped} manifest row(s) with a duplicate or missing participant id");
    }
    Ok(participants)
}
