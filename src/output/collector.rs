//! Builder collecting per-sample merge results into a `MergeSummary`

use std::io::Write;
use std::path::Path;

use crate::errors::Result;

use crate::fusion::SampleGroup;

use super::types::{MergeSummary, SampleSummary};

pub struct SummaryCollector {
    summary: MergeSummary,
}

impl SummaryCollector {
    pub fn new() -> Self {
        Self {
            summary: MergeSummary {
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
        }
    }

    /// Record an input that was not merged
    pub fn with_skipped(mut self, path: &Path) -> Self {
        self.summary.skipped.push(path.display().to_string());
        self
    }

    /// Record a finalized sample group and where it was written
    pub fn with_sample(mut self, sample: &str, group: &SampleGroup, output: Option<&Path>) -> Self {
        self.summary.samples.push(SampleSummary {
            sample: sample.to_string(),
            sources: group
                .sources()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            rows_read: group.rows_read(),
            duplicates_dropped: group.duplicates(),
            rows_written: group.table().len(),
            output: output.map(|p| p.display().to_string()),
        });
        self
    }

    pub fn build(self) -> MergeSummary {
        self.summary
    }
}

impl Default for SummaryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeSummary {
    /// Write this summary as pretty JSON
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(std::io::Error::other)?;
        writeln!(writer)?;
        Ok(())
    }
}
