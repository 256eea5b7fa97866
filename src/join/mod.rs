//! Hash joins and row gathers over string-keyed record batches.
//!
//! The tracker accumulates its wide table by repeatedly left-joining value
//! columns onto a fixed (participant, visit) grid. The join here is pure
//! and row-preserving: the left side never loses or gains rows, so folding
//! any number of merges over it is order-independent.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::{Result, TrackerError};
use crate::utils::arrow::string_column;

// Separator for composite key strings; never appears in the data.
const KEY_SEPARATOR: &str = "\u{1f}";

fn cell(array: &StringArray, row: usize) -> Option<&str> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}

/// Composite key for one row, or None when any component is null (null
/// keys never match, mirroring how missing identifiers behave in joins)
fn row_key(keys: &[&StringArray], row: usize) -> Option<String> {
    let mut parts = Vec::with_capacity(keys.len());
    for key in keys {
        if key.is_null(row) {
            return None;
        }
        parts.push(key.value(row));
    }
    Some(parts.iter().join(KEY_SEPARATOR))
}

/// Left-join value columns from `right` onto `left`
///
/// Both sides must carry the `on` key columns as strings; the named value
/// columns are gathered from `right` into new nullable columns appended to
/// `left`. Rows of `left` without a match receive nulls.
///
/// Exact duplicate rows on the right collapse to their first occurrence;
/// duplicate keys with conflicting values are a data-format error, because
/// they could not be merged without changing the left side's grain.
///
/// # Errors
/// Returns an error on missing columns, value-column name collisions with
/// the left side, or conflicting duplicate keys
pub fn left_join(
    left: &RecordBatch,
    right: &RecordBatch,
    on: &[&str],
    values: &[&str],
) -> Result<RecordBatch> {
    let left_keys = on
        .iter()
        .map(|name| string_column(left, name))
        .collect::<Result<Vec<_>>>()?;
    let right_keys = on
        .iter()
        .map(|name| string_column(right, name))
        .collect::<Result<Vec<_>>>()?;
    let right_values = values
        .iter()
        .map(|name| string_column(right, name))
        .collect::<Result<Vec<_>>>()?;

    let mut lookup: FxHashMap<String, u32> = FxHashMap::default();
    for row in 0..right.num_rows() {
        let Some(key) = row_key(&right_keys, row) else {
            continue;
        };
        let row_index = u32::try_from(row)
            .map_err(|_| TrackerError::format_err("join table has too many rows"))?;
        match lookup.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(row_index);
            }
            Entry::Occupied(entry) => {
                let first = *entry.get() as usize;
                let identical = right_values
                    .iter()
                    .all(|column| cell(column, first) == cell(column, row));
                if !identical {
                    return Err(TrackerError::format_err(format!(
                        "duplicate entries with conflicting values for key ({})",
                        entry.key().split(KEY_SEPARATOR).join(", ")
                    )));
                }
            }
        }
    }

    let indices: UInt32Array = (0..left.num_rows())
        .map(|row| row_key(&left_keys, row).and_then(|key| lookup.get(&key).copied()))
        .collect();

    let mut fields: Vec<Field> = left
        .schema()
        .fields()
        .iter()
        .map(|field| field.as_ref().clone())
        .collect();
    let mut columns = left.columns().to_vec();
    for (name, column) in values.iter().zip(&right_values) {
        if left.schema().index_of(name).is_ok() {
            return Err(TrackerError::schema(format!(
                "Cannot merge column {name}: name already present in the grid"
            )));
        }
        let gathered = take(*column, &indices, None)?;
        fields.push(Field::new(*name, DataType::Utf8, true));
        columns.push(gathered);
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}

/// Repeat every row of a batch `times` times, in place (row i appears
/// `times` consecutive times)
pub fn repeat_rows(batch: &RecordBatch, times: usize) -> Result<RecordBatch> {
    let indices: UInt32Array = (0..batch.num_rows())
        .flat_map(|row| std::iter::repeat_n(row as u32, times))
        .map(Some)
        .collect();
    let columns = batch
        .columns()
        .iter()
        .map(|column| take(column, &indices, None))
        .collect::<arrow::error::Result<Vec<ArrayRef>>>()?;
    let batch = RecordBatch::try_new(batch.schema(), columns)?;
    Ok(batch)
}
