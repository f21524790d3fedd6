//! Output module: merged tables and the run summary
//!
//! This module provides:
//! - TSV writing of filtered/merged tables with overwrite protection
//! - `StagedOutputs`: all-or-nothing placement of a run's output files
//! - `MergeSummary`: per-sample accounting of a merge run, serialized as JSON
//! - `SummaryCollector`: a builder for `MergeSummary`
//!
//! # Example
//!
//! ```ignore
//! use fimerge::output::SummaryCollector;
//!
//! let summary = SummaryCollector::new()
//!     .with_sample("sample1", group, Some(&path))
//!     .build();
//! summary.write_json(std::io::stdout())?;
//! ```

pub mod collector;
pub mod schema;
pub mod staging;
pub mod tsv;
pub mod types;

pub use collector::SummaryCollector;
pub use staging::StagedOutputs;
pub use tsv::{check_output_path, write_table};
pub use types::{MergeSummary, SampleSummary};
