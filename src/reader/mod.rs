//! Module for reading delimited text files into Arrow record batches.
//!
//! Every column is read as a nullable string: the tables this crate
//! consumes mix numeric codes and free text in the same columns, and
//! participant identifiers must never be reinterpreted as numbers. Empty
//! cells are normalized to nulls so that "value present" checks behave the
//! same regardless of which source wrote the file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, TrackerError};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default batch size for delimited-text reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Field delimiter implied by a file extension (`.tsv` is tab, anything
/// else is comma)
#[must_use]
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

/// Read a delimited text file into a single record batch with every column
/// typed as a nullable string
///
/// # Arguments
/// * `path` - Path to the CSV/TSV file (delimiter chosen by extension)
///
/// # Returns
/// One `RecordBatch` holding the whole file, empty cells as nulls
///
/// # Errors
/// Returns an error if the file does not exist or cannot be parsed
pub fn read_delimited(path: &Path) -> Result<RecordBatch> {
    if !path.exists() {
        return Err(TrackerError::file_not_found(path));
    }
    log_operation_start("Reading delimited file", path);

    let delimiter = delimiter_for_path(path);
    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);

    // Probe the header for column names; the declared types are ignored
    // because everything is read as a string.
    let file = File::open(path)?;
    let (header_schema, _) = format.infer_schema(BufReader::new(file), Some(0))?;
    let fields: Vec<Field> = header_schema
        .fields()
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, true))
        .collect();
    let schema: SchemaRef = Arc::new(Schema::new(fields));

    let file = File::open(path)?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let batch = concat_batches(&schema, &batches)?;
    let batch = nullify_empty(&batch)?;
    log_operation_complete("read", path, batch.num_rows());
    Ok(batch)
}

/// Replace empty strings with nulls across all string columns
fn nullify_empty(batch: &RecordBatch) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|column| match column.as_any().downcast_ref::<StringArray>() {
            Some(strings) => {
                let nullified: StringArray = strings
                    .iter()
                    .map(|value| value.filter(|text| !text.is_empty()))
                    .collect();
                Arc::new(nullified) as ArrayRef
            }
            None => column.clone(),
        })
        .collect();
    let batch = RecordBatch::try_new(batch.schema(), columns)?;
    Ok(batch)
}

/// Serialize a record batch as delimited text with a header row
///
/// # Errors
/// Returns an error if serialization fails
pub fn render_delimited(batch: &RecordBatch, delimiter: u8) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(delimiter)
        .build(Vec::new());
    writer.write(batch)?;
    let bytes = writer.into_inner();
    String::from_utf8(bytes)
        .map_err(|e| TrackerError::format_err(format!("output is not valid UTF-8: {e}")))
}

/// Serialize a record batch as comma-separated text with a header row
pub fn render_csv(batch: &RecordBatch) -> Result<String> {
    render_delimited(batch, b',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_all_columns_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "scores.csv", "PATNO,EVENT_ID,MCATOT\n3001,BL,26\n");
        let batch = read_delimited(&path).unwrap();
        assert_eq!(batch.num_rows(), 1);
        for field in batch.schema().fields() {
            assert_eq!(field.data_type(), &DataType::Utf8);
        }
    }

    #[test]
    fn empty_cells_become_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "scores.csv", "PATNO,EVENT_ID,MCATOT\n3001,BL,\n");
        let batch = read_delimited(&path).unwrap();
        let scores = crate::utils::arrow::string_column(&batch, "MCATOT").unwrap();
        assert!(scores.is_null(0));
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "participants.tsv", "participant_id\tage\nsub-3001\t61\n");
        let batch = read_delimited(&path).unwrap();
        assert_eq!(batch.num_columns(), 2);
        let ids = crate::utils::arrow::string_column(&batch, "participant_id").unwrap();
        assert_eq!(ids.value(0), "sub-3001");
    }

    #[test]
    fn missing_file_fails_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_delimited(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(TrackerError::Io(_))));
    }

    #[test]
    fn render_round_trips_nulls_as_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "scores.csv", "PATNO,MCATOT\n3001,\n3002,24\n");
        let batch = read_delimited(&path).unwrap();
        let rendered = render_csv(&batch).unwrap();
        assert_eq!(rendered, "PATNO,MCATOT\n3001,\n3002,24\n");
    }
}
