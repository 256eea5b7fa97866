//! Builder for constructing the tracker table step by step.

use std::fmt;

use arrow::record_batch::RecordBatch;

use crate::config::GlobalConfig;
use crate::error::{Result, TrackerError};
use crate::reader::read_delimited;

use super::{assessments, availability, grid, imaging, manifest};

/// Summary counts for one tracker run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSummary {
    /// Participants retained from the manifest
    pub participants: usize,
    /// Visit codes in the reference list
    pub visits: usize,
    /// Grid rows before availability filtering (participants x visits)
    pub grid_rows: usize,
    /// Rows remaining after availability filtering
    pub rows: usize,
    /// Columns in the final table
    pub columns: usize,
}

impl fmt::Display for TrackerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} participant(s) x {} visit(s) = {} grid row(s); {} row(s) with data across {} column(s)",
            self.participants, self.visits, self.grid_rows, self.rows, self.columns
        )
    }
}

/// The finished tracker table plus its summary counts
#[derive(Debug)]
pub struct TrackerTable {
    /// One row per (participant, visit) pair that has any data
    pub batch: RecordBatch,
    /// Row/column counts gathered while building
    pub summary: TrackerSummary,
}

/// Builder running the tracker pipeline one stage at a time
pub struct TrackerBuilder {
    config: GlobalConfig,
    table: Option<RecordBatch>,
    visits: Vec<String>,
    check_columns: Vec<String>,
    participants: usize,
    grid_rows: usize,
}

impl TrackerBuilder {
    /// Create a builder for the given configuration
    #[must_use]
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            config,
            table: None,
            visits: Vec::new(),
            check_columns: Vec::new(),
            participants: 0,
            grid_rows: 0,
        }
    }

    /// The current intermediate table, if a stage has produced one
    #[must_use]
    pub fn current_table(&self) -> Option<&RecordBatch> {
        self.table.as_ref()
    }

    fn take_table(&mut self, stage: &str) -> Result<RecordBatch> {
        self.table
            .take()
            .ok_or_else(|| TrackerError::config(format!("{stage} called before load_manifest")))
    }

    /// Load the manifest and filter it to the configured groups
    pub fn load_manifest(mut self) -> Result<Self> {
        let participants =
            manifest::load_manifest(&self.config.manifest_path(), &self.config.groups)?;
        self.participants = participants.num_rows();
        self.table = Some(participants);
        Ok(self)
    }

    /// Attach BIDS identifiers from the imaging participants table, when
    /// one is configured
    pub fn attach_imaging(mut self) -> Result<Self> {
        let Some(path) = self.config.imaging_path() else {
            log::info!("No imaging participants table configured; skipping BIDS id attachment");
            return Ok(self);
        };
        let participants = self.take_table("attach_imaging")?;
        let imaging = read_delimited(&path)?;
        let joined = imaging::attach_bids_ids(&participants, &imaging)?;
        self.table = Some(joined);
        Ok(self)
    }

    /// Expand the participant table into the participant x visit grid
    pub fn expand_visits(mut self) -> Result<Self> {
        let participants = self.take_table("expand_visits")?;
        self.visits = grid::load_visits(&self.config.visits_path())?;
        let expanded = grid::expand_visits(&participants, &self.visits)?;
        self.grid_rows = expanded.num_rows();
        self.table = Some(expanded);
        Ok(self)
    }

    /// Merge every configured demographic and assessment column onto the
    /// grid, remembering the produced value columns for the availability
    /// filter
    pub fn merge_tables(mut self) -> Result<Self> {
        let table = self.take_table("merge_tables")?;
        let (merged, check_columns) =
            assessments::merge_tables(&table, &self.config, &self.visits)?;
        self.check_columns = check_columns;
        self.table = Some(merged);
        Ok(self)
    }

    /// Drop grid rows where no demographic value or assessment score is
    /// populated
    pub fn filter_availability(mut self) -> Result<Self> {
        let table = self.take_table("filter_availability")?;
        self.table = Some(availability::filter_available(&table, &self.check_columns)?);
        Ok(self)
    }

    /// Finish the pipeline and return the table with its summary
    pub fn build(mut self) -> Result<TrackerTable> {
        let batch = self.take_table("build")?;
        let summary = TrackerSummary {
            participants: self.participants,
            visits: self.visits.len(),
            grid_rows: self.grid_rows,
            rows: batch.num_rows(),
            columns: batch.num_columns(),
        };
        log::info!("Built tracker table: {summary}");
        Ok(TrackerTable { batch, summary })
    }

    /// Run the whole pipeline for a configuration
    pub fn run(config: GlobalConfig) -> Result<TrackerTable> {
        Self::new(config)
            .load_manifest()?
            .attach_imaging()?
            .expand_visits()?
            .merge_tables()?
            .filter_availability()?
            .build()
    }
}
