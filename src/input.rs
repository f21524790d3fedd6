//! Loading of FusionInspector tab-separated fusion tables.
//!
//! A table is read as its header (the [`Schema`]) plus one [`FusionRecord`] per
//! row. Every field is kept verbatim as text; columns are only interpreted by
//! the operations that need them, so a missing column surfaces when that
//! operation runs rather than at load time.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::errors::{FusionError, Result};

/// Ordered column names of a table with a name -> index lookup.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from header names. Duplicate names are rejected since
    /// name lookup would be ambiguous.
    pub fn new(columns: Vec<String>) -> std::result::Result<Self, String> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(format!("duplicate column '{}' in header", name));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for Schema {}

/// One row of a fusion table, one field per schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionRecord {
    fields: Vec<String>,
}

impl FusionRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at a column index resolved against this record's schema
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Field by column name, if the schema has that column
    pub fn get<'a>(&'a self, schema: &Schema, column: &str) -> Option<&'a str> {
        schema.index_of(column).map(|idx| self.field(idx))
    }
}

/// A header plus its rows, in file order.
#[derive(Debug, Clone)]
pub struct FusionTable {
    source: PathBuf,
    schema: Schema,
    records: Vec<FusionRecord>,
}

impl FusionTable {
    pub fn new(source: impl Into<PathBuf>, schema: Schema, records: Vec<FusionRecord>) -> Self {
        Self {
            source: source.into(),
            schema,
            records,
        }
    }

    /// Load a table from a TSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FusionError::MissingFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
            return Err(FusionError::MissingFile {
                path: path.to_path_buf(),
                source: std::io::Error::other("path is a directory"),
            });
        }
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse a table from any reader; `source` names it in error messages.
    pub fn from_reader<R: Read>(reader: R, source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .flexible(false)
            .from_reader(reader);

        let header = reader
            .headers()
            .map_err(|e| table_error(source, e))?
            .clone();
        if header.iter().all(str::is_empty) {
            return Err(FusionError::malformed(source, "missing header row"));
        }
        let schema = Schema::new(header.iter().map(str::to_string).collect())
            .map_err(|reason| FusionError::malformed(source, reason))?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| table_error(source, e))?;
            records.push(FusionRecord::new(row.iter().map(str::to_string).collect()));
        }

        Ok(Self::new(source, schema, records))
    }

    /// Path the table was loaded from (the first contributing file for merged tables)
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[FusionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FusionRecord> {
        self.records
    }

    /// Rows for in-place reordering or removal; callers keep each row's
    /// field count equal to the schema length.
    pub(crate) fn records_mut(&mut self) -> &mut Vec<FusionRecord> {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same source and schema, different rows
    pub fn with_records(&self, records: Vec<FusionRecord>) -> Self {
        Self {
            source: self.source.clone(),
            schema: self.schema.clone(),
            records,
        }
    }

    /// Resolve a column index, failing with `MissingColumn` if absent.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.schema
            .index_of(column)
            .ok_or_else(|| FusionError::MissingColumn {
                column: column.to_string(),
                path: self.source.clone(),
            })
    }
}

fn table_error(source: &Path, err: csv::Error) -> FusionError {
    let reason = match err.kind() {
        csv::ErrorKind::UnequalLengths { pos, expected_len, len } => {
            let line = pos.as_ref().map_or(0, |p| p.line());
            format!("line {} has {} fields, header has {}", line, len, expected_len)
        }
        _ => err.to_string(),
    };
    match err.into_kind() {
        csv::ErrorKind::Io(e) => FusionError::MissingFile {
            path: source.to_path_buf(),
            source: e,
        },
        _ => FusionError::malformed(source, reason),
    }
}
