//! In-frame filtering of coding-effect-annotated fusion tables.

use log::debug;

use crate::config::FilterConfig;
use crate::errors::Result;
use crate::input::FusionTable;

/// Keep rows whose `PROT_FUSION_TYPE` is exactly `INFRAME`.
pub fn filter_in_frame(table: &FusionTable) -> Result<FusionTable> {
    filter_by(table, &FilterConfig::default())
}

/// Keep rows whose `config.column` equals `config.keep_value`, in original order.
/// The input table is left untouched.
pub fn filter_by(table: &FusionTable, config: &FilterConfig) -> Result<FusionTable> {
    let idx = table.require_column(&config.column)?;
    let kept: Vec<_> = table
        .records()
        .iter()
        .filter(|r| r.field(idx) == config.keep_value)
        .cloned()
        .collect();

    debug!(
        "{}: kept {} of {} rows with {} == {}",
        table.source().display(),
        kept.len(),
        table.len(),
        config.column,
        config.keep_value
    );
    Ok(table.with_records(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FusionError;
    use std::io::Cursor;

    const TABLE: &str = "#FusionName\tPROT_FUSION_TYPE\tJunctionReadCount\n\
        A--B\tINFRAME\t5\n\
        C--D\tFRAMESHIFT\t9\n\
        E--F\tINFRAME\t1\n\
        G--H\t.\t3\n\
        I--J\tinframe\t4\n";

    #[test]
    fn test_keeps_only_in_frame_in_order() {
        let table = FusionTable::from_reader(Cursor::new(TABLE), "s.tsv").unwrap();
        let filtered = filter_in_frame(&table).unwrap();

        let names: Vec<&str> = filtered.records().iter().map(|r| r.field(0)).collect();
        assert_eq!(names, vec!["A--B", "E--F"]);
        assert_eq!(filtered.schema(), table.schema());
        // input untouched
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_missing_filter_column() {
        let table = FusionTable::from_reader(Cursor::new("#FusionName\nA--B\n"), "s.tsv").unwrap();
        let err = filter_in_frame(&table).unwrap_err();
        assert!(matches!(err, FusionError::MissingColumn { ref column, .. } if column == "PROT_FUSION_TYPE"));
    }

    #[test]
    fn test_configured_value() {
        let table = FusionTable::from_reader(Cursor::new(TABLE), "s.tsv").unwrap();
        let config = FilterConfig {
            keep_value: "FRAMESHIFT".to_string(),
            ..Default::default()
        };
        let filtered = filter_by(&table, &config).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].field(0), "C--D");
    }
}
