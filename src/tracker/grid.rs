//! The (participant, visit) reconciliation grid.

use std::path::Path;
use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, TrackerError};
use crate::filter::distinct_values;
use crate::join::repeat_rows;
use crate::reader::read_delimited;
use crate::utils::arrow::{append_column, require_columns};

use super::COL_EVENT_ID;

/// Load the visit-reference table and return its distinct visit codes in
/// first-seen order
pub fn load_visits(path: &Path) -> Result<Vec<String>> {
    let batch = read_delimited(path)?;
    require_columns(&batch, &[COL_EVENT_ID], "visit reference table")?;
    let visits = distinct_values(&batch, COL_EVENT_ID)?;
    if visits.is_empty() {
        return Err(TrackerError::schema(format!(
            "visit reference table {} contains no visit codes",
            path.display()
        )));
    }
    log::info!("Loaded {} visit code(s) from {}", visits.len(), path.display());
    Ok(visits)
}

/// Expand the participant table into the full participant x visit grid
///
/// Every participant row is repeated once per visit code
/// (participant-major), so the output has exactly
/// `participants.num_rows() * visits.len()` rows and reruns on identical
/// inputs produce identical row order.
pub fn expand_visits(participants: &RecordBatch, visits: &[String]) -> Result<RecordBatch> {
    let repeated = repeat_rows(participants, visits.len())?;
    let visit_values: StringArray = (0..participants.num_rows())
        .flat_map(|_| visits.iter().map(|visit| Some(visit.as_str())))
        .collect();
    let grid = append_column(
        &repeated,
        Field::new(COL_EVENT_ID, DataType::Utf8, true),
        Arc::new(visit_values),
    )?;
    log::info!(
        "Expanded {} participant(s) x {} visit(s) into a {}-row grid",
        participants.num_rows(),
        visits.len(),
        grid.num_rows()
    );
    Ok(grid)
}
