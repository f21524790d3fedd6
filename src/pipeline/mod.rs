use log::info;
use std::path::{Path, PathBuf};

use crate::config::MergeConfig;
use crate::errors::Result;
use crate::fusion::{filter_by, merge_all};
use crate::input::FusionTable;
use crate::output::{check_output_path, write_table, MergeSummary, StagedOutputs, SummaryCollector};

/// Result from MergeRunner::run().
#[derive(Debug)]
pub struct MergeResult {
    pub summary: MergeSummary,
    /// Merged tables written, one per sample, in first-seen order
    pub outputs: Vec<PathBuf>,
}

/// Load, merge and write per-sample tables.
///
/// Everything is loaded and merged and every output path checked before the
/// first write. Outputs are staged beside their destinations and moved into
/// place only once all of them are written, so a failed run leaves no output.
pub struct MergeRunner<'a> {
    inputs: Vec<PathBuf>,
    out_dir: PathBuf,
    force: bool,
    summary_path: Option<PathBuf>,
    config: Option<&'a MergeConfig>,
}

impl<'a> MergeRunner<'a> {
    pub fn new<P: AsRef<Path>>(inputs: &[P], out_dir: impl AsRef<Path>) -> Self {
        Self {
            inputs: inputs.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            out_dir: out_dir.as_ref().to_path_buf(),
            force: false,
            summary_path: None,
            config: None,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_summary(mut self, path: Option<&Path>) -> Self {
        self.summary_path = path.map(Path::to_path_buf);
        self
    }

    pub fn with_config(mut self, config: &'a MergeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn run(self) -> Result<MergeResult> {
        let default_config = MergeConfig::default();
        let config = self.config.unwrap_or(&default_config);
        info!("Merging {} input(s) into {}", self.inputs.len(), self.out_dir.display());

        let groups = merge_all(&self.inputs, config)?;

        let outputs: Vec<PathBuf> = groups
            .samples()
            .map(|sample| self.out_dir.join(config.merged_file_name(sample)))
            .collect();
        if let Some(ref path) = self.summary_path {
            check_output_path(path, self.force)?;
        }
        for path in &outputs {
            check_output_path(path, self.force)?;
        }
        if !outputs.is_empty() && !self.out_dir.exists() {
            info!("Creating output directory: {:?}", self.out_dir);
            std::fs::create_dir_all(&self.out_dir)?;
        }

        let mut staged = StagedOutputs::new();
        let mut collector = SummaryCollector::new();
        for path in self.inputs.iter().filter(|p| !config.accepts(p)) {
            collector = collector.with_skipped(path);
        }
        for ((sample, group), path) in groups.iter().zip(&outputs) {
            staged.stage(path, |w| write_table(group.table(), w))?;
            collector = collector.with_sample(sample, group, Some(path.as_path()));
        }

        let summary = collector.build();
        if let Some(ref path) = self.summary_path {
            staged.stage(path, |w| summary.write_json(w))?;
        }

        staged.commit()?;
        for path in &outputs {
            info!("Merged file saved to {}", path.display());
        }
        if let Some(ref path) = self.summary_path {
            info!("Merge summary saved to {}", path.display());
        }

        Ok(MergeResult { summary, outputs })
    }
}

/// Filter one coding-effect table down to in-frame calls.
pub struct FilterRunner<'a> {
    input: PathBuf,
    out_prefix: String,
    out_dir: PathBuf,
    force: bool,
    config: Option<&'a MergeConfig>,
}

impl<'a> FilterRunner<'a> {
    pub fn new(input: impl AsRef<Path>, out_prefix: &str, out_dir: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            out_prefix: out_prefix.to_string(),
            out_dir: out_dir.as_ref().to_path_buf(),
            force: false,
            config: None,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_config(mut self, config: &'a MergeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns the path of the filtered table.
    pub fn run(self) -> Result<PathBuf> {
        let default_config = MergeConfig::default();
        let config = &self.config.unwrap_or(&default_config).filter;

        let output = self
            .out_dir
            .join(format!("{}{}", self.out_prefix, config.filtered_suffix));
        check_output_path(&output, self.force)?;

        let table = FusionTable::from_path(&self.input)?;
        let filtered = filter_by(&table, config)?;
        info!(
            "Retained {} of {} fusions with {} == {}",
            filtered.len(),
            table.len(),
            config.column,
            config.keep_value
        );

        if !self.out_dir.exists() {
            info!("Creating output directory: {:?}", self.out_dir);
            std::fs::create_dir_all(&self.out_dir)?;
        }
        let mut staged = StagedOutputs::new();
        staged.stage(&output, |w| write_table(&filtered, w))?;
        staged.commit()?;
        Ok(output)
    }
}
