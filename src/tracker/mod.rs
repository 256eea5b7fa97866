//! The tracker pipeline: manifest loading, imaging-id attachment, visit
//! grid expansion, demographic/assessment merging, and availability
//! filtering.
//!
//! Each stage is a `RecordBatch -> RecordBatch` transformation over the
//! same (participant, visit) grain; `TrackerBuilder` wires them together.

pub mod assessments;
pub mod availability;
pub mod builder;
pub mod grid;
pub mod imaging;
pub mod manifest;

pub use builder::{TrackerBuilder, TrackerSummary, TrackerTable};

/// Participant identifier column, shared by the manifest and the grid
pub const COL_PARTICIPANT_ID: &str = "participant_id";

/// Diagnostic group column in the manifest
pub const COL_GROUP: &str = "group";

/// Imaging (BIDS) identifier column attached by the imaging join
pub const COL_BIDS_ID: &str = "bids_id";

/// Visit code column, shared by the reference list, the source tables and
/// the grid
pub const COL_EVENT_ID: &str = "EVENT_ID";

/// Participant identifier column as named in the raw study tables
pub const COL_SOURCE_SUBJECT: &str = "PATNO";

/// Stratification label column in assessment tables
pub const COL_STRATUM: &str = "PAG_NAME";

/// Suffix of the per-score presence flag columns
pub const STATUS_SUFFIX: &str = "_status";
