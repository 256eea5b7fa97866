//! Helpers for working with the all-string record batches produced by the
//! delimited-text reader.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, TrackerError};

/// Find a column by name and downcast it to a string array
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| TrackerError::schema(format!("Column {name} not found in batch")))?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| TrackerError::schema(format!("Column {name} is not a string array")))
}

/// Check that a batch contains every named column
///
/// # Errors
/// Returns a schema error listing the missing columns
pub fn require_columns(batch: &RecordBatch, names: &[&str], what: &str) -> Result<()> {
    let schema = batch.schema();
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| schema.index_of(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TrackerError::schema(format!(
            "{what} is missing expected column(s): {}",
            missing.join(", ")
        )))
    }
}

/// Return a new batch with one column renamed
pub fn rename_column(batch: &RecordBatch, from: &str, to: &str) -> Result<RecordBatch> {
    let schema = batch.schema();
    if schema.index_of(from).is_err() {
        return Err(TrackerError::schema(format!(
            "Cannot rename column {from}: not present in batch"
        )));
    }
    if schema.index_of(to).is_ok() {
        return Err(TrackerError::schema(format!(
            "Cannot rename column {from} to {to}: target name already present"
        )));
    }
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            if field.name() == from {
                Field::new(to, field.data_type().clone(), field.is_nullable())
            } else {
                field.as_ref().clone()
            }
        })
        .collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), batch.columns().to_vec())?;
    Ok(batch)
}

/// Return a new batch with an extra column appended
pub fn append_column(batch: &RecordBatch, field: Field, column: ArrayRef) -> Result<RecordBatch> {
    if batch.schema().index_of(field.name()).is_ok() {
        return Err(TrackerError::schema(format!(
            "Cannot append column {}: name already present",
            field.name()
        )));
    }
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(field);
    let mut columns = batch.columns().to_vec();
    columns.push(column);
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}

/// Return a new batch containing only the named columns, in the given order
pub fn select_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let indices = names
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| TrackerError::schema(format!("Column {name} not found in batch")))
        })
        .collect::<Result<Vec<_>>>()?;
    let batch = batch.project(&indices)?;
    Ok(batch)
}
