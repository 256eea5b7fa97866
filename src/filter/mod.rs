//! Row filtering for record batches
//!
//! Boolean-mask building and mask application used by every pipeline stage
//! that drops rows (group allow-list, stratum selection, availability).

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::compute::{is_not_null, or};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::{Result, TrackerError};
use crate::utils::arrow::string_column;

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
///
/// # Errors
/// Returns an error if filtering fails
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(TrackerError::schema(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    let batch = RecordBatch::try_new(batch.schema(), filtered_columns)?;
    Ok(batch)
}

/// Create a mask selecting rows whose column value is in the given set
///
/// Null values never match.
pub fn in_set_mask(batch: &RecordBatch, column: &str, allowed: &FxHashSet<String>) -> Result<BooleanArray> {
    let values = string_column(batch, column)?;
    let mask_values: Vec<bool> = (0..values.len())
        .map(|i| !values.is_null(i) && allowed.contains(values.value(i)))
        .collect();
    Ok(BooleanArray::from(mask_values))
}

/// Create a mask selecting rows whose column value equals the given value
///
/// Null values never match.
pub fn eq_mask(batch: &RecordBatch, column: &str, value: &str) -> Result<BooleanArray> {
    let values = string_column(batch, column)?;
    let mask_values: Vec<bool> = (0..values.len())
        .map(|i| !values.is_null(i) && values.value(i) == value)
        .collect();
    Ok(BooleanArray::from(mask_values))
}

/// Create a mask selecting rows where at least one of the named columns is
/// non-null
///
/// Columns absent from the batch contribute nothing (they count as missing
/// everywhere).
pub fn any_present_mask(batch: &RecordBatch, columns: &[String]) -> Result<BooleanArray> {
    let mut mask = BooleanArray::from(vec![false; batch.num_rows()]);
    for name in columns {
        let Ok(idx) = batch.schema().index_of(name) else {
            continue;
        };
        let present = is_not_null(batch.column(idx))?;
        mask = or(&mask, &present)?;
    }
    Ok(mask)
}

/// Distinct non-null values of a string column, in first-seen order
pub fn distinct_values(batch: &RecordBatch, column: &str) -> Result<Vec<String>> {
    let values = string_column(batch, column)?;
    let mut seen = FxHashSet::default();
    let mut distinct = Vec::new();
    for i in 0..values.len() {
        if values.is_null(i) {
            continue;
        }
        let value = values.value(i);
        if seen.insert(value.to_string()) {
            distinct.push(value.to_string());
        }
    }
    Ok(distinct)
}

/// Keep only the first row for each distinct value of a string column
///
/// Rows with a null key are dropped. The number of dropped rows is returned
/// alongside the deduplicated batch.
pub fn dedup_by_column(batch: &RecordBatch, column: &str) -> Result<(RecordBatch, usize)> {
    let values = string_column(batch, column)?;
    let mut seen = FxHashSet::default();
    let mask_values: Vec<bool> = (0..values.len())
        .map(|i| !values.is_null(i) && seen.insert(values.value(i).to_string()))
        .collect();
    let dropped = mask_values.iter().filter(|keep| !**keep).count();
    let deduped = filter_record_batch(batch, &BooleanArray::from(mask_values))?;
    Ok((deduped, dropped))
}

/// Helper to build an `FxHashSet` from string slices
#[must_use]
pub fn value_set<S: AsRef<str>>(values: &[S]) -> FxHashSet<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}
