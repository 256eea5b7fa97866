//! Dropping grid rows with no data at all.

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::{any_present_mask, filter_record_batch};

/// Keep only rows where at least one check column (a demographic value or
/// an assessment score) is populated
///
/// A row with every check column null carries no information for its
/// (participant, visit) pair and is dropped. Check columns that were never
/// merged count as missing everywhere.
pub fn filter_available(grid: &RecordBatch, check_columns: &[String]) -> Result<RecordBatch> {
    if check_columns.is_empty() {
        log::warn!("No check columns configured; every grid row will be dropped");
    }
    let mask = any_present_mask(grid, check_columns)?;
    let rows_before = grid.num_rows();
    let filtered = filter_record_batch(grid, &mask)?;
    log::info!(
        "Availability filter kept {} of {} grid row(s)",
        filtered.num_rows(),
        rows_before
    );
    Ok(filtered)
}
