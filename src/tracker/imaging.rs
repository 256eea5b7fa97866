//! Attaching imaging (BIDS) identifiers to the participant table.
//!
//! The imaging-conversion step writes a participants table whose
//! `participant_id` values are BIDS identifiers (`sub-<code>`). The numeric
//! code after the delimiter is the join key back to the manifest.

use std::sync::Arc;

use arrow::array::Array;
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::join::left_join;
use crate::utils::arrow::{require_columns, string_column};
use crate::utils::bids_id_to_code;

use super::{COL_BIDS_ID, COL_PARTICIPANT_ID};

/// Left-join `bids_id` onto the participant table
///
/// Every participant is retained; those without a converted imaging
/// session simply get a null `bids_id`.
///
/// # Errors
/// Returns a data-format error when any imaging identifier lacks the
/// delimiter or a numeric code
pub fn attach_bids_ids(participants: &RecordBatch, imaging: &RecordBatch) -> Result<RecordBatch> {
    require_columns(imaging, &[COL_PARTICIPANT_ID], "imaging participants table")?;
    let bids_ids = string_column(imaging, COL_PARTICIPANT_ID)?;

    let mut codes: Vec<Option<String>> = Vec::with_capacity(bids_ids.len());
    let mut identifiers: Vec<Option<String>> = Vec::with_capacity(bids_ids.len());
    for row in 0..bids_ids.len() {
        if bids_ids.is_null(row) {
            continue;
        }
        let bids_id = bids_ids.value(row);
        let code = bids_id_to_code(bids_id)?;
        codes.push(Some(code.to_string()));
        identifiers.push(Some(bids_id.to_string()));
    }
    log::info!(
        "Derived {} imaging join key(s) from {} imaging row(s)",
        codes.len(),
        imaging.num_rows()
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new(COL_PARTICIPANT_ID, DataType::Utf8, true),
        Field::new(COL_BIDS_ID, DataType::Utf8, true),
    ]));
    let codes: StringArray = codes.into_iter().collect();
    let identifiers: StringArray = identifiers.into_iter().collect();
    let keyed = RecordBatch::try_new(schema, vec![Arc::new(codes), Arc::new(identifiers)])?;

    left_join(participants, &keyed, &[COL_PARTICIPANT_ID], &[COL_BIDS_ID])
}
