//! Dataset locations.

use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "data";
const FINANCIAL_FILE: &str = "MA Hospital  FY14-18 Indicators.csv";
const TOP_DISCHARGES_FILE: &str = "MA top 15 Discharges Final.csv";
const DISCHARGES_BY_LOCATION_FILE: &str = "MA FY18 Discharges by Location.csv";

/// Paths of the three CSV files the dashboard reads at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub financial: PathBuf,
    pub top_discharges: PathBuf,
    pub discharges_by_location: PathBuf,
}

impl Default for DataSources {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

impl DataSources {
    /// Standard file names resolved against `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            financial: dir.join(FINANCIAL_FILE),
            top_discharges: dir.join(TOP_DISCHARGES_FILE),
            discharges_by_location: dir.join(DISCHARGES_BY_LOCATION_FILE),
        }
    }

    /// Folder holding the financial dataset, used as the label in the UI.
    pub fn data_dir(&self) -> Option<&Path> {
        self.financial.parent()
    }
}
