//! Error types for loading, filtering and merging fusion tables.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fimerge operations
pub type Result<T> = std::result::Result<T, FusionError>;

/// Error type for fimerge operations.
///
/// Every variant is fatal for the run: these describe data-integrity problems,
/// not transient faults, so nothing is retried.
#[derive(Error, Debug)]
pub enum FusionError {
    /// Input path does not resolve to a readable file
    #[error("Cannot read fusion table '{}': {source}", path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be parsed as a tab-separated table with a header row
    #[error("Malformed fusion table '{}': {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    /// A column required by the attempted operation is absent from the header
    #[error("Required column '{column}' not found in '{}'", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// A table's header differs from the header of the group it is merged into
    #[error(
        "Header of '{}' does not match the header already merged for sample '{sample}'",
        path.display()
    )]
    SchemaMismatch { sample: String, path: PathBuf },

    /// Output file exists and overwriting was not requested
    #[error("Output file {} already exists. Use --force to overwrite.", path.display())]
    OutputExists { path: PathBuf },

    /// Configuration file could not be read or decoded
    #[error("Invalid configuration '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FusionError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FusionError::MalformedTable { path: path.into(), reason: reason.into() }
    }
}
