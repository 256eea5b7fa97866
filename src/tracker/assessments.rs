//! Merging demographic and assessment columns onto the grid.
//!
//! The merge list is declarative: each entry names a source file, a value
//! column and (for assessments) a stratum policy. Entries are folded onto
//! the grid through the pure left join, so adding a score to the tracker
//! is one new config entry, and merge order cannot change the result.

use std::path::Path;
use std::sync::Arc;

use arrow::compute::is_not_null;
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;

use crate::config::{AssessmentEntry, DemographicEntry, GlobalConfig, StratumPolicy};
use crate::error::{Result, TrackerError};
use crate::filter::{distinct_values, eq_mask, filter_record_batch, in_set_mask, value_set};
use crate::join::left_join;
use crate::reader::read_delimited;
use crate::utils::arrow::{append_column, rename_column, require_columns, select_columns};
use crate::utils::logging::create_progress_bar;

use super::{COL_EVENT_ID, COL_PARTICIPANT_ID, COL_SOURCE_SUBJECT, COL_STRATUM, STATUS_SUFFIX};

/// Load a source table, renaming the raw subject column to the grid's
/// participant column and optionally restricting to the tracked visits
fn load_source(path: &Path, visits: Option<&[String]>) -> Result<RecordBatch> {
    let batch = read_delimited(path)?;
    let batch = if batch.schema().index_of(COL_SOURCE_SUBJECT).is_ok() {
        rename_column(&batch, COL_SOURCE_SUBJECT, COL_PARTICIPANT_ID)?
    } else {
        batch
    };
    require_columns(&batch, &[COL_PARTICIPANT_ID], "source table")?;

    if let Some(visits) = visits {
        require_columns(&batch, &[COL_EVENT_ID], "source table")?;
        let mask = in_set_mask(&batch, COL_EVENT_ID, &value_set(visits))?;
        let restricted = filter_record_batch(&batch, &mask)?;
        log::debug!(
            "Restricted {} to {} of {} rows at tracked visits",
            path.display(),
            restricted.num_rows(),
            batch.num_rows()
        );
        Ok(restricted)
    } else {
        Ok(batch)
    }
}

/// Join one value column onto the grid and, when asked, append its
/// `_status` presence flag
fn join_value_column(
    grid: &RecordBatch,
    source: &RecordBatch,
    keys: &[&str],
    source_column: &str,
    output_column: &str,
    with_status: bool,
) -> Result<RecordBatch> {
    let mut selected: Vec<&str> = keys.to_vec();
    selected.push(source_column);
    let keyed = select_columns(source, &selected)?;
    let keyed = if source_column == output_column {
        keyed
    } else {
        rename_column(&keyed, source_column, output_column)?
    };

    let merged = left_join(grid, &keyed, keys, &[output_column])?;
    if !with_status {
        return Ok(merged);
    }

    let score_idx = merged
        .schema()
        .index_of(output_column)
        .map_err(|_| TrackerError::schema(format!("Column {output_column} lost during merge")))?;
    let present = is_not_null(merged.column(score_idx))?;
    append_column(
        &merged,
        Field::new(format!("{output_column}{STATUS_SUFFIX}"), DataType::Boolean, false),
        Arc::new(present),
    )
}

/// Merge one demographic column onto the grid
///
/// Static entries carry one value per participant and join on
/// `participant_id` alone; non-static entries join on the full
/// (participant, visit) key.
///
/// Returns the grid plus the name of the value column it contributed.
pub fn merge_demographic(
    grid: &RecordBatch,
    entry: &DemographicEntry,
    config: &GlobalConfig,
    visits: &[String],
) -> Result<(RecordBatch, Vec<String>)> {
    let path = config.resolve(&entry.file);
    let source = if entry.is_static {
        load_source(&path, None)?
    } else {
        load_source(&path, Some(visits))?
    };
    require_columns(&source, &[entry.column.as_str()], "demographics table")?;

    let keys: &[&str] = if entry.is_static {
        &[COL_PARTICIPANT_ID]
    } else {
        &[COL_PARTICIPANT_ID, COL_EVENT_ID]
    };
    let merged = join_value_column(grid, &source, keys, &entry.column, &entry.column, false)?;
    log::info!("Merged demographic column {} from {}", entry.column, path.display());
    Ok((merged, vec![entry.column.clone()]))
}

/// Merge one assessment's total score onto the grid
///
/// The stratum policy decides what happens to the `PAG_NAME` label:
/// selecting one stratum keeps the source column name, retaining all
/// widens each stratum into its own `<score>_<stratum>` column. Every
/// produced score column gets a `_status` presence flag.
///
/// Returns the grid plus the names of the score columns it contributed.
pub fn merge_assessment(
    grid: &RecordBatch,
    entry: &AssessmentEntry,
    config: &GlobalConfig,
    visits: &[String],
) -> Result<(RecordBatch, Vec<String>)> {
    let path = config.resolve(&entry.file);
    let source = load_source(&path, Some(visits))?;
    require_columns(
        &source,
        &[entry.score_column.as_str(), COL_STRATUM],
        "assessment table",
    )?;
    let keys: &[&str] = &[COL_PARTICIPANT_ID, COL_EVENT_ID];

    match &entry.stratum {
        StratumPolicy::Select(stratum) => {
            let mask = eq_mask(&source, COL_STRATUM, stratum)?;
            let subset = filter_record_batch(&source, &mask)?;
            log::info!(
                "Merging {} ({} of {} rows in stratum {})",
                entry.score_column,
                subset.num_rows(),
                source.num_rows(),
                stratum
            );
            let merged =
                join_value_column(grid, &subset, keys, &entry.score_column, &entry.score_column, true)?;
            Ok((merged, vec![entry.score_column.clone()]))
        }
        StratumPolicy::RetainAll => {
            let strata = distinct_values(&source, COL_STRATUM)?;
            if strata.is_empty() {
                log::warn!(
                    "Assessment table {} has no stratum labels; no columns merged",
                    path.display()
                );
                return Ok((grid.clone(), Vec::new()));
            }
            log::info!(
                "Merging {} across {} stratum(s) from {}",
                entry.score_column,
                strata.len(),
                path.display()
            );
            let mut merged = grid.clone();
            let mut produced = Vec::with_capacity(strata.len());
            for stratum in &strata {
                let mask = eq_mask(&source, COL_STRATUM, stratum)?;
                let subset = filter_record_batch(&source, &mask)?;
                let output_column = format!("{}_{stratum}", entry.score_column);
                merged =
                    join_value_column(&merged, &subset, keys, &entry.score_column, &output_column, true)?;
                produced.push(output_column);
            }
            Ok((merged, produced))
        }
    }
}

/// Fold every configured demographic and assessment entry onto the grid
///
/// Returns the widened grid and the list of value columns that were
/// produced, which become the availability filter's check columns.
pub fn merge_tables(
    grid: &RecordBatch,
    config: &GlobalConfig,
    visits: &[String],
) -> Result<(RecordBatch, Vec<String>)> {
    let total = config.demographics.len() + config.assessments.len();
    let progress = create_progress_bar(total as u64, Some("merging tables"));

    let mut merged = grid.clone();
    let mut check_columns = Vec::new();
    for entry in &config.demographics {
        let (next, produced) = merge_demographic(&merged, entry, config, visits)?;
        merged = next;
        check_columns.extend(produced);
        progress.inc(1);
    }
    for entry in &config.assessments {
        let (next, produced) = merge_assessment(&merged, entry, config, visits)?;
        merged = next;
        check_columns.extend(produced);
        progress.inc(1);
    }
    progress.finish_and_clear();

    log::info!(
        "Merged {} table(s) into a {}-column grid",
        total,
        merged.num_columns()
    );
    Ok((merged, check_columns))
}
