//! Shared fixtures for the integration tests.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use cohort_tracker::config::GlobalConfig;

/// Write a fixture file under the dataset root, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// A minimal configuration over the given dataset root: three diagnostic
/// groups, no demographics, no assessments
pub fn base_config(root: &Path) -> GlobalConfig {
    GlobalConfig {
        dataset_root: root.to_path_buf(),
        manifest: "tabular/manifest.csv".into(),
        imaging_participants: None,
        visits: "tabular/visits.csv".into(),
        groups: vec!["PD".to_string(), "Control".to_string(), "SWEDD".to_string()],
        demographics: Vec::new(),
        assessments: Vec::new(),
        output: "tabular/tracker.csv".into(),
        backups_dir: "tabular/.tracker_versions".into(),
    }
}

/// Write the three-participant manifest and two-visit reference list used
/// by most scenarios
pub fn write_base_tables(root: &Path) {
    write_file(
        root,
        "tabular/manifest.csv",
        "participant_id,group\n3001,PD\n3002,Control\n3003,SWEDD\n",
    );
    write_file(root, "tabular/visits.csv", "EVENT_ID\nBL\nV04\n");
}
