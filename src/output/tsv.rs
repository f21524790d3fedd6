//! Writing fusion tables back out as TSV

use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use crate::errors::{FusionError, Result};
use crate::input::FusionTable;

/// Write header and rows tab-delimited, fields verbatim, no index column.
pub fn write_table<W: Write>(table: &FusionTable, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    writer.write_record(table.schema().columns()).map_err(csv_io)?;
    for record in table.records() {
        writer.write_record(record.fields()).map_err(csv_io)?;
    }
    writer.flush()?;
    Ok(())
}

/// Refuse to clobber an existing output unless `force` is set.
/// A directory in the way is refused even with `force`.
pub fn check_output_path(path: &Path, force: bool) -> Result<()> {
    if path.is_dir() {
        return Err(FusionError::Io(std::io::Error::new(
            std::io::ErrorKind::IsADirectory,
            format!("Output path {} is a directory", path.display()),
        )));
    }
    if !force && path.exists() {
        return Err(FusionError::OutputExists { path: path.to_path_buf() });
    }
    Ok(())
}

fn csv_io(err: csv::Error) -> FusionError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => FusionError::Io(e),
        other => FusionError::Io(std::io::Error::other(format!("{:?}", other))),
    }
}
