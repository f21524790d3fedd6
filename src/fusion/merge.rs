//! Per-sample merging of fusion tables.
//!
//! Tables are grouped by a sample key taken from the file name. Each table
//! folded into a group is appended after the rows already there, duplicate
//! calls are dropped (first occurrence wins) and the group is re-ranked by
//! junction reads, then spanning fragments, both descending.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use crate::config::MergeConfig;
use crate::errors::{FusionError, Result};
use crate::fusion::columns::{EvidenceColumns, IdentityKey};
use crate::input::FusionTable;

/// Sample key of an input file: its base name up to the first `delimiter`.
///
/// `sample1_L.FusionInspector.fusions.abridged.tsv.coding_effect` -> `sample1`.
/// Two different samples sharing a prefix are indistinguishable here.
pub fn derive_sample_key(path: &Path, delimiter: char) -> String {
    let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
    name.split(delimiter).next().unwrap_or_default().to_string()
}

/// Row accounting for one `merge_group` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStep {
    /// Rows contributed by the incoming table
    pub incoming: usize,
    /// Rows dropped as duplicates of an earlier row
    pub duplicates: usize,
}

/// Drop rows whose identity key was already seen, keeping the first.
/// Returns the number of rows removed.
pub fn dedup_records(table: &mut FusionTable) -> Result<usize> {
    let key = IdentityKey::resolve(table)?;
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(table.len());
        table.records().iter().map(|r| seen.insert(key.of(r))).collect()
    };

    let before = table.len();
    let mut flags = keep.into_iter();
    table.records_mut().retain(|_| flags.next().unwrap_or(true));
    Ok(before - table.len())
}

/// Stable sort by (JunctionReadCount, SpanningFragCount), descending.
pub fn rank_records(table: &mut FusionTable) -> Result<()> {
    let evidence = EvidenceColumns::resolve(table)?;
    table
        .records_mut()
        .sort_by_cached_key(|r| Reverse(evidence.support(r)));
    Ok(())
}

/// Fold `incoming` into the group's current table.
///
/// Rows of `existing` come first, then rows of `incoming`, each in original
/// order; the result is deduplicated and ranked. The first table of a group
/// goes through the same dedup and ranking, so merging a table twice gives
/// the same result as merging it once.
pub fn merge_group(
    existing: Option<FusionTable>,
    incoming: FusionTable,
    sample: &str,
) -> Result<(FusionTable, MergeStep)> {
    let incoming_rows = incoming.len();
    let mut table = match existing {
        None => incoming,
        Some(mut table) => {
            if table.schema() != incoming.schema() {
                return Err(FusionError::SchemaMismatch {
                    sample: sample.to_string(),
                    path: incoming.source().to_path_buf(),
                });
            }
            table.records_mut().extend(incoming.into_records());
            table
        }
    };

    let duplicates = dedup_records(&mut table)?;
    rank_records(&mut table)?;
    Ok((
        table,
        MergeStep {
            incoming: incoming_rows,
            duplicates,
        },
    ))
}

/// One sample's merged table and where it came from.
#[derive(Debug, Clone)]
pub struct SampleGroup {
    table: FusionTable,
    sources: Vec<PathBuf>,
    rows_read: usize,
    duplicates: usize,
}

impl SampleGroup {
    pub fn table(&self) -> &FusionTable {
        &self.table
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    fn take_table(&mut self) -> FusionTable {
        let empty = self.table.with_records(Vec::new());
        std::mem::replace(&mut self.table, empty)
    }
}

/// Sample key -> merged group, in the order samples were first seen.
#[derive(Debug, Clone)]
pub struct SampleGroups {
    delimiter: char,
    groups: IndexMap<String, SampleGroup>,
}

impl SampleGroups {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            groups: IndexMap::new(),
        }
    }

    /// Merge a loaded table into the group named by its source file.
    /// Returns the sample key it was merged into.
    pub fn absorb(&mut self, table: FusionTable) -> Result<String> {
        let key = derive_sample_key(table.source(), self.delimiter);
        let source = table.source().to_path_buf();

        // Checked before the group's table is taken so a failed absorb leaves
        // the group as it was.
        IdentityKey::resolve(&table)?;
        EvidenceColumns::resolve(&table)?;
        let existing = match self.groups.get_mut(&key) {
            Some(group) => {
                if group.table.schema() != table.schema() {
                    return Err(FusionError::SchemaMismatch { sample: key, path: source });
                }
                Some(group.take_table())
            }
            None => None,
        };

        let (merged, step) = merge_group(existing, table, &key)?;
        debug!(
            "{}: {} rows from {}, {} duplicates dropped, {} rows total",
            key,
            step.incoming,
            source.display(),
            step.duplicates,
            merged.len()
        );

        let group = self.groups.entry(key.clone()).or_insert_with(|| SampleGroup {
            table: merged.with_records(Vec::new()),
            sources: Vec::new(),
            rows_read: 0,
            duplicates: 0,
        });
        group.table = merged;
        group.sources.push(source);
        group.rows_read += step.incoming;
        group.duplicates += step.duplicates;
        Ok(key)
    }

    pub fn get(&self, sample: &str) -> Option<&SampleGroup> {
        self.groups.get(sample)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SampleGroup)> {
        self.groups.iter()
    }

    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

/// Load and merge every input carrying the configured marker, in the given order.
///
/// Inputs without the marker are skipped. Any load or merge failure aborts the
/// whole merge, since ranking is only meaningful with every contributing file.
pub fn merge_all<P: AsRef<Path>>(paths: &[P], config: &MergeConfig) -> Result<SampleGroups> {
    let mut groups = SampleGroups::new(config.sample_delimiter);

    for path in paths {
        let path = path.as_ref();
        if !config.accepts(path) {
            debug!(
                "Skipping {} (name does not end with {})",
                path.display(),
                config.input_marker
            );
            continue;
        }

        let table = FusionTable::from_path(path)?;
        info!("Loaded {} rows from {}", table.len(), path.display());
        groups.absorb(table)?;
    }

    info!(
        "Merged {} sample group(s): {}",
        groups.len(),
        groups.samples().collect::<Vec<_>>().join(", ")
    );
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const HEADER: &str = "#FusionName\tJunctionReadCount\tSpanningFragCount\test_J\test_S\t\
        LeftGene\tLeftLocalBreakpoint\tLeftBreakpoint\tRightGene\tRightLocalBreakpoint\t\
        RightBreakpoint\tSpliceType\tLargeAnchorSupport\tNumCounterFusionLeft\t\
        NumCounterFusionRight\tFAR_left\tFAR_right\tannots";

    fn row(name: &str, jrc: &str, sfc: &str, annots: &str) -> String {
        format!(
            "{name}\t{jrc}\t{sfc}\t{jrc}.00\t{sfc}.00\tG1\t100\tchr1:100:+\tG2\t200\tchr2:200:-\t\
             ONLY_REF_SPLICE\tYES_LDAS\t0\t0\t2.5\t3.1\t{annots}"
        )
    }

    fn table(source: &str, rows: &[String]) -> FusionTable {
        let mut data = format!("{HEADER}\n");
        for r in rows {
            data.push_str(r);
            data.push('\n');
        }
        FusionTable::from_reader(Cursor::new(data), source).unwrap()
    }

    fn names(table: &FusionTable) -> Vec<&str> {
        table.records().iter().map(|r| r.field(0)).collect()
    }

    fn left_right() -> (FusionTable, FusionTable) {
        let left = table(
            "sample1_L.coding_effect",
            &[row("A--A", "5", "2", "left"), row("B--B", "3", "9", "left")],
        );
        let right = table(
            "sample1_R.coding_effect",
            &[row("A--A", "5", "2", "right"), row("C--C", "10", "1", "right")],
        );
        (left, right)
    }

    #[test]
    fn test_derive_sample_key() {
        assert_eq!(
            derive_sample_key(Path::new("/data/run1/sample1_FusionInspector.fusions.abridged.tsv.coding_effect"), '_'),
            "sample1"
        );
        assert_eq!(derive_sample_key(Path::new("sample2_x.coding_effect"), '_'), "sample2");
        // the marker itself contains the delimiter
        assert_eq!(derive_sample_key(Path::new("plain.coding_effect"), '_'), "plain.coding");
        assert_eq!(derive_sample_key(Path::new("plain.tsv"), '_'), "plain.tsv");
        assert_eq!(derive_sample_key(Path::new("run_a/s3.L.coding_effect"), '.'), "s3");
    }

    #[test]
    fn test_scenario_left_right() {
        let (left, right) = left_right();
        let (merged, first) = merge_group(None, left, "sample1").unwrap();
        assert_eq!(first, MergeStep { incoming: 2, duplicates: 0 });
        let (merged, second) = merge_group(Some(merged), right, "sample1").unwrap();

        assert_eq!(names(&merged), vec!["C--C", "A--A", "B--B"]);
        assert_eq!(second, MergeStep { incoming: 2, duplicates: 1 });
        // first occurrence keeps its passthrough columns
        assert_eq!(merged.records()[1].field(17), "left");
    }

    #[test]
    fn test_merge_same_table_twice_is_idempotent() {
        let (left, _) = left_right();
        let (once, _) = merge_group(None, left.clone(), "sample1").unwrap();
        let (twice, step) = merge_group(Some(once.clone()), left, "sample1").unwrap();
        assert_eq!(once.records(), twice.records());
        assert_eq!(step.duplicates, 2);
    }

    #[test]
    fn test_first_table_is_deduplicated() {
        let t = table(
            "s_1.coding_effect",
            &[row("A--A", "1", "1", "x"), row("A--A", "1", "1", "y")],
        );
        let (merged, step) = merge_group(None, t, "s").unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(step.duplicates, 1);
        assert_eq!(merged.records()[0].field(17), "x");
    }

    #[test]
    fn test_non_key_columns_do_not_affect_identity() {
        let t = table(
            "s_1.coding_effect",
            &[row("A--A", "4", "1", "x"), row("A--A", "4", "2", "x")],
        );
        let (merged, _) = merge_group(None, t, "s").unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_survivor_set_is_order_invariant() {
        let (left, right) = left_right();
        let (a, _) = merge_group(None, left.clone(), "sample1").unwrap();
        let (a, _) = merge_group(Some(a), right.clone(), "sample1").unwrap();
        let (b, _) = merge_group(None, right, "sample1").unwrap();
        let (b, _) = merge_group(Some(b), left, "sample1").unwrap();

        let key_a = IdentityKey::resolve(&a).unwrap();
        let mut keys_a: Vec<_> = a.records().iter().map(|r| key_a.of(r)).collect();
        let mut keys_b: Vec<_> = b.records().iter().map(|r| key_a.of(r)).collect();
        keys_a.sort();
        keys_b.sort();
        assert_eq!(keys_a, keys_b);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_ranking_is_descending_and_stable() {
        let t = table(
            "s_1.coding_effect",
            &[
                row("A", "2", "1", "."),
                row("B", "7", "0", "."),
                row("C", "2", "4", "."),
                row("D", "NA", "9", "."),
                row("E", "2", "1", "."),
                row("B", "7", "0", "z"),
            ],
        );
        let (merged, _) = merge_group(None, t, "s").unwrap();
        // second B differs only outside the key and is dropped; E stays after A
        assert_eq!(names(&merged), vec!["B", "C", "A", "E", "D"]);

        let evidence = EvidenceColumns::resolve(&merged).unwrap();
        for pair in merged.records().windows(2) {
            assert!(evidence.support(&pair[0]) >= evidence.support(&pair[1]));
        }
    }

    #[test]
    fn test_schema_mismatch() {
        let (left, _) = left_right();
        let other = FusionTable::from_reader(
            Cursor::new(format!("{HEADER}\textra\n")),
            "sample1_X.coding_effect",
        )
        .unwrap();
        let err = merge_group(Some(left), other, "sample1").unwrap_err();
        assert!(matches!(err, FusionError::SchemaMismatch { ref sample, .. } if sample == "sample1"));
    }

    #[test]
    fn test_missing_identity_column() {
        let t = FusionTable::from_reader(
            Cursor::new("#FusionName\tJunctionReadCount\tSpanningFragCount\nA\t1\t1\n"),
            "s_1.coding_effect",
        )
        .unwrap();
        let err = merge_group(None, t, "s").unwrap_err();
        assert!(matches!(err, FusionError::MissingColumn { ref column, .. } if column == "est_J"));
    }

    #[test]
    fn test_sample_groups_keep_samples_apart() {
        let (left, right) = left_right();
        let other = table("sample2_x.coding_effect", &[row("A--A", "5", "2", "s2")]);

        let mut groups = SampleGroups::new('_');
        assert_eq!(groups.absorb(left).unwrap(), "sample1");
        assert_eq!(groups.absorb(other).unwrap(), "sample2");
        assert_eq!(groups.absorb(right).unwrap(), "sample1");

        assert_eq!(groups.samples().collect::<Vec<_>>(), vec!["sample1", "sample2"]);
        let s1 = groups.get("sample1").unwrap();
        assert_eq!(s1.table().len(), 3);
        assert_eq!(s1.sources().len(), 2);
        assert_eq!(s1.rows_read(), 4);
        assert_eq!(s1.duplicates(), 1);
        assert_eq!(groups.get("sample2").unwrap().table().len(), 1);
    }

    #[test]
    fn test_failed_absorb_keeps_group() {
        let (left, _) = left_right();
        let mut groups = SampleGroups::new('_');
        groups.absorb(left).unwrap();

        let wider = FusionTable::from_reader(
            Cursor::new(format!("{HEADER}\textra\n")),
            "sample1_X.coding_effect",
        )
        .unwrap();
        assert!(groups.absorb(wider).is_err());
        let narrow = FusionTable::from_reader(
            Cursor::new("#FusionName\tJunctionReadCount\n"),
            "sample1_Y.coding_effect",
        )
        .unwrap();
        let err = groups.absorb(narrow).unwrap_err();
        assert!(matches!(err, FusionError::MissingColumn { .. }));

        let s1 = groups.get("sample1").unwrap();
        assert_eq!(s1.table().len(), 2);
        assert_eq!(s1.sources().len(), 1);
    }

    #[test]
    fn test_merge_all_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, rows) in [
            ("sample1_a.coding_effect", vec![row("A--A", "5", "2", "."), row("B--B", "3", "9", ".")]),
            ("sample1_b.coding_effect", vec![row("A--A", "5", "2", "."), row("C--C", "10", "1", ".")]),
            ("sample2_x.coding_effect", vec![row("D--D", "1", "1", ".")]),
            ("sample3_y.tsv", vec![row("E--E", "1", "1", ".")]),
        ] {
            let path = dir.path().join(name);
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "{HEADER}").unwrap();
            for r in rows {
                writeln!(file, "{r}").unwrap();
            }
            paths.push(path);
        }
        // non-marker paths are skipped without being opened
        paths.push(dir.path().join("missing.bam"));

        let groups = merge_all(&paths, &MergeConfig::default()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(names(groups.get("sample1").unwrap().table()), vec!["C--C", "A--A", "B--B"]);
        assert!(groups.get("sample3").is_none());
    }

    #[test]
    fn test_merge_all_missing_file_is_fatal() {
        let err = merge_all(&["/nonexistent/sample1_a.coding_effect"], &MergeConfig::default())
            .unwrap_err();
        assert!(matches!(err, FusionError::MissingFile { .. }));
    }
}
