//! Utility functions shared across the tracker pipeline.

pub mod arrow;
pub mod logging;

use crate::error::{Result, TrackerError};

/// Prefix used by BIDS participant identifiers
pub const BIDS_PREFIX: &str = "sub-";

/// Delimiter separating the BIDS prefix from the numeric subject code
pub const BIDS_DELIMITER: char = '-';

/// Convert a bare participant code to its BIDS identifier
///
/// # Example
/// ```
/// use cohort_tracker::utils::participant_id_to_bids_id;
/// assert_eq!(participant_id_to_bids_id("3001"), "sub-3001");
/// ```
#[must_use]
pub fn participant_id_to_bids_id(participant_id: &str) -> String {
    format!("{BIDS_PREFIX}{participant_id}")
}

/// Extract the numeric subject code from a BIDS identifier
///
/// The identifier must contain the fixed delimiter and end in a numeric
/// code (`sub-3001` -> `3001`).
///
/// # Errors
/// Returns a data-format error when the delimiter is absent or the suffix
/// is not numeric.
pub fn bids_id_to_code(bids_id: &str) -> Result<&str> {
    let (_, code) = bids_id.rsplit_once(BIDS_DELIMITER).ok_or_else(|| {
        TrackerError::format_err(format!(
            "malformed imaging identifier {bids_id:?}: missing {BIDS_DELIMITER:?} delimiter"
        ))
    })?;
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TrackerError::format_err(format!(
            "malformed imaging identifier {bids_id:?}: expected a numeric code after the delimiter"
        )));
    }
    Ok(code)
}
