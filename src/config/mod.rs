//! Global configuration for a tracker run.
//!
//! All paths to source tables live in one JSON file that is loaded once at
//! startup and threaded explicitly through the pipeline; nothing reads
//! ambient state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// How to handle the stratification label (`PAG_NAME`) of an assessment
/// table before merging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StratumPolicy {
    /// Keep only rows belonging to the named stratum; the score column keeps
    /// its source name.
    Select(String),
    /// Keep every stratum, widening each into its own
    /// `<score>_<stratum>` column.
    #[default]
    RetainAll,
}

/// One demographic column to merge onto the tracker grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicEntry {
    /// Source file, relative to the dataset root
    pub file: PathBuf,
    /// Name of the value column in the source file
    pub column: String,
    /// Whether the value is per-participant rather than per-visit
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// One assessment score column to merge onto the tracker grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentEntry {
    /// Source file, relative to the dataset root
    pub file: PathBuf,
    /// Name of the total-score column in the source file
    pub score_column: String,
    /// Stratum handling for this table
    #[serde(default)]
    pub stratum: StratumPolicy,
}

/// Configuration for one tracker run, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Root directory of the dataset; every other path is relative to it
    pub dataset_root: PathBuf,
    /// Manifest table (`participant_id`, `group`)
    pub manifest: PathBuf,
    /// Participants table written by the imaging conversion step; omit if
    /// conversion has not run yet
    #[serde(default)]
    pub imaging_participants: Option<PathBuf>,
    /// Visit-reference table (`EVENT_ID`)
    pub visits: PathBuf,
    /// Diagnostic groups to retain from the manifest
    pub groups: Vec<String>,
    /// Demographic columns to merge, in order
    #[serde(default)]
    pub demographics: Vec<DemographicEntry>,
    /// Assessment score columns to merge, in order
    #[serde(default)]
    pub assessments: Vec<AssessmentEntry>,
    /// Output table path
    pub output: PathBuf,
    /// Directory holding timestamped versions of the output
    #[serde(default = "default_backups_dir")]
    pub backups_dir: PathBuf,
}

fn default_backups_dir() -> PathBuf {
    PathBuf::from("tabular/.tracker_versions")
}

impl GlobalConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TrackerError::file_not_found(path));
        }
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            TrackerError::config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(TrackerError::config(
                "group allow-list is empty; every participant would be dropped",
            ));
        }
        for entry in &self.assessments {
            if entry.score_column.is_empty() {
                return Err(TrackerError::config(format!(
                    "assessment entry for {} has an empty score column",
                    entry.file.display()
                )));
            }
        }
        Ok(())
    }

    /// Resolve a path relative to the dataset root
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.dataset_root.join(relative)
    }

    /// Absolute path to the manifest table
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    /// Absolute path to the imaging participants table, if configured
    #[must_use]
    pub fn imaging_path(&self) -> Option<PathBuf> {
        self.imaging_participants.as_deref().map(|p| self.resolve(p))
    }

    /// Absolute path to the visit-reference table
    #[must_use]
    pub fn visits_path(&self) -> PathBuf {
        self.resolve(&self.visits)
    }

    /// Absolute path to the output table
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    /// Absolute path to the backups directory
    #[must_use]
    pub fn backups_path(&self) -> PathBuf {
        self.resolve(&self.backups_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stratum_policy_deserializes_both_forms() {
        let select: StratumPolicy = serde_json::from_str(r#"{"select": "NUPDR3OF"}"#).unwrap();
        assert_eq!(select, StratumPolicy::Select("NUPDR3OF".to_string()));

        let retain: StratumPolicy = serde_json::from_str(r#""retain-all""#).unwrap();
        assert_eq!(retain, StratumPolicy::RetainAll);
    }

    #[test]
    fn empty_group_list_is_rejected() {
        let config = GlobalConfig {
            dataset_root: PathBuf::from("/data"),
            manifest: PathBuf::from("manifest.csv"),
            imaging_participants: None,
            visits: PathBuf::from("visits.csv"),
            groups: vec![],
            demographics: vec![],
            assessments: vec![],
            output: PathBuf::from("tracker.csv"),
            backups_dir: default_backups_dir(),
        };
        assert!(config.validate().is_err());
    }
}
