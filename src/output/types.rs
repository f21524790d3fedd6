//! Serializable summary of a merge run

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level merge summary, one entry per sample group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MergeSummary {
    /// fimerge version that produced the outputs
    pub version: String,

    /// Inputs skipped for not carrying the coding-effect marker
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,

    /// Per-sample results, in the order samples were first seen
    pub samples: Vec<SampleSummary>,
}

/// Merge result for a single sample key
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SampleSummary {
    /// Sample key derived from the input file names
    pub sample: String,

    /// Input files merged into this sample, in merge order
    pub sources: Vec<String>,

    /// Data rows read across all sources
    pub rows_read: usize,

    /// Rows dropped as duplicate fusion calls
    pub duplicates_dropped: usize,

    /// Rows in the merged table
    pub rows_written: usize,

    /// Merged table path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}
