//! Run-wide settings passed explicitly to each engine

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Diagnostic and regression-mode switches that relax certain validations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Privileged mode: permits illustrating in unapproved states and
    /// honors the input definition of material change
    #[serde(default)]
    pub privileged: bool,

    /// Regression testing: permits illustrating in unapproved states
    #[serde(default)]
    pub regression_testing: bool,

    /// Directory prepended to every table file name
    #[serde(default)]
    pub data_directory: PathBuf,
}

impl GlobalSettings {
    /// Settings for regression runs, which bypass state approval
    pub fn regression() -> Self {
        Self {
            regression_testing: true,
            ..Default::default()
        }
    }

    /// Resolve a product-data file name against the data directory
    pub fn add_data_dir(&self, file_name: &str) -> String {
        if self.data_directory.as_os_str().is_empty() {
            file_name.to_string()
        } else {
            self.data_directory.join(Path::new(file_name)).to_string_lossy().into_owned()
        }
    }
}
