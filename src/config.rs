//! Configuration for filtering and merging fusion tables.
//!
//! Every field has a default matching FusionInspector's file naming, so a
//! config file only needs to list what it overrides:
//!
//! ```json
//! { "sample_delimiter": ".", "filter": { "keep_value": "FRAMESHIFT" } }
//! ```

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::{FusionError, Result};
use crate::fusion::FusionColumn;

/// In-frame filter settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Column holding the predicted coding consequence
    #[serde(default = "default_filter_column")]
    pub column: String,
    /// Value a row must carry (exact match) to be retained
    #[serde(default = "default_keep_value")]
    pub keep_value: String,
    /// Appended to the output prefix to name the filtered file
    #[serde(default = "default_filtered_suffix")]
    pub filtered_suffix: String,
}

fn default_filter_column() -> String { FusionColumn::ProtFusionType.header().to_string() }
fn default_keep_value() -> String { "INFRAME".to_string() }
fn default_filtered_suffix() -> String {
    "_FusionInspector.fusions.abridged.inframe.tsv.coding_effect".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            column: default_filter_column(),
            keep_value: default_keep_value(),
            filtered_suffix: default_filtered_suffix(),
        }
    }
}

/// Merge settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Only inputs whose file name ends with this marker are merged
    #[serde(default = "default_input_marker")]
    pub input_marker: String,
    /// Sample key is the file base name up to the first occurrence of this character
    #[serde(default = "default_sample_delimiter")]
    pub sample_delimiter: char,
    /// Appended to the sample key to name the merged output
    #[serde(default = "default_merged_suffix")]
    pub merged_suffix: String,
    #[serde(default)]
    pub filter: FilterConfig,
}

fn default_input_marker() -> String { ".coding_effect".to_string() }
fn default_sample_delimiter() -> char { '_' }
fn default_merged_suffix() -> String {
    "_FusionInspector.fusions.abridged.merged.tsv".to_string()
}

impl MergeConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |reason: String| FusionError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| config_error(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| config_error(e.to_string()))
    }

    /// Whether a path names a coding-effect table that should be merged
    pub fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|f| f.to_str())
            .is_some_and(|name| name.ends_with(&self.input_marker))
    }

    pub fn merged_file_name(&self, sample: &str) -> String {
        format!("{}{}", sample, self.merged_suffix)
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_marker: default_input_marker(),
            sample_delimiter: default_sample_delimiter(),
            merged_suffix: default_merged_suffix(),
            filter: FilterConfig::default(),
        }
    }
}
