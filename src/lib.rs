//! A Rust library for curating longitudinal study tables into a single
//! participant-by-visit availability tracker, with delimited-text reading,
//! record-batch joins, and idempotent transfer planning.

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod join;
pub mod output;
pub mod reader;
pub mod tracker;
pub mod transfer;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{AssessmentEntry, DemographicEntry, GlobalConfig, StratumPolicy};
pub use error::{Result, TrackerError};
pub use tracker::{TrackerBuilder, TrackerSummary, TrackerTable};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Filtering and joining capabilities
pub use filter::{any_present_mask, eq_mask, filter_record_batch, in_set_mask};
pub use join::left_join;

// Transfer planning
pub use transfer::{FileTransfer, LocalDirTransport, TransferStatus, Transport};

// Utility functions
pub use reader::{read_delimited, render_csv};
