//! Configuration for the daily pipelines.
//!
//! Replaces a module-level base directory with an explicit value handed to
//! each pipeline, so tests can point every pipeline at a temporary directory.

use crate::constants::{self, DATA_DIR_NAME};
use crate::models::YearRange;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the data folder
    pub base_dir: PathBuf,

    /// Name of the folder under `base_dir` with raw inputs and cache artifacts
    pub data_dir: String,

    /// Years kept by the fixed `import_csv` wrappers
    pub default_range: YearRange,

    /// Raw weather exports read by the weather `import_csv` wrapper
    pub weather_default_files: Vec<String>,

    /// Rows scanned for CSV schema inference (`None` = whole file)
    pub infer_schema_rows: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            data_dir: DATA_DIR_NAME.to_string(),
            default_range: YearRange::default(),
            weather_default_files: constants::weather::DEFAULT_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            infer_schema_rows: None,
        }
    }
}

impl PipelineConfig {
    /// Create configuration rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::default().with_base_dir(base_dir)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_default_range(mut self, range: YearRange) -> Self {
        self.default_range = range;
        self
    }

    pub fn with_weather_default_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weather_default_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_infer_schema_rows(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_rows = rows;
        self
    }

    /// Folder with raw inputs and cache artifacts
    pub fn data_path(&self) -> PathBuf {
        self.base_dir.join(&self.data_dir)
    }

    /// Path of a file inside the data folder
    pub fn data_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.data_path().join(name)
    }
}
