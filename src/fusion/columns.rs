//! Named FusionInspector columns, the dedup identity key and the
//! evidence-support ordering.

use std::cmp::Ordering;

use crate::errors::Result;
use crate::input::{FusionRecord, FusionTable};

/// Load-bearing columns of a coding-effect-annotated abridged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FusionColumn {
    FusionName,
    JunctionReadCount,
    SpanningFragCount,
    EstJ,
    EstS,
    LeftGene,
    LeftLocalBreakpoint,
    LeftBreakpoint,
    RightGene,
    RightLocalBreakpoint,
    RightBreakpoint,
    SpliceType,
    LargeAnchorSupport,
    NumCounterFusionLeft,
    NumCounterFusionRight,
    FarLeft,
    FarRight,
    ProtFusionType,
}

impl FusionColumn {
    /// Columns that together decide whether two rows are the same fusion call
    pub const IDENTITY_KEY: [FusionColumn; 17] = [
        FusionColumn::FusionName,
        FusionColumn::JunctionReadCount,
        FusionColumn::SpanningFragCount,
        FusionColumn::EstJ,
        FusionColumn::EstS,
        FusionColumn::LeftGene,
        FusionColumn::LeftLocalBreakpoint,
        FusionColumn::LeftBreakpoint,
        FusionColumn::RightGene,
        FusionColumn::RightLocalBreakpoint,
        FusionColumn::RightBreakpoint,
        FusionColumn::SpliceType,
        FusionColumn::LargeAnchorSupport,
        FusionColumn::NumCounterFusionLeft,
        FusionColumn::NumCounterFusionRight,
        FusionColumn::FarLeft,
        FusionColumn::FarRight,
    ];

    /// Header name as written by FusionInspector
    pub fn header(&self) -> &'static str {
        match self {
            FusionColumn::FusionName => "#FusionName",
            FusionColumn::JunctionReadCount => "JunctionReadCount",
            FusionColumn::SpanningFragCount => "SpanningFragCount",
            FusionColumn::EstJ => "est_J",
            FusionColumn::EstS => "est_S",
            FusionColumn::LeftGene => "LeftGene",
            FusionColumn::LeftLocalBreakpoint => "LeftLocalBreakpoint",
            FusionColumn::LeftBreakpoint => "LeftBreakpoint",
            FusionColumn::RightGene => "RightGene",
            FusionColumn::RightLocalBreakpoint => "RightLocalBreakpoint",
            FusionColumn::RightBreakpoint => "RightBreakpoint",
            FusionColumn::SpliceType => "SpliceType",
            FusionColumn::LargeAnchorSupport => "LargeAnchorSupport",
            FusionColumn::NumCounterFusionLeft => "NumCounterFusionLeft",
            FusionColumn::NumCounterFusionRight => "NumCounterFusionRight",
            FusionColumn::FarLeft => "FAR_left",
            FusionColumn::FarRight => "FAR_right",
            FusionColumn::ProtFusionType => "PROT_FUSION_TYPE",
        }
    }
}

/// Identity key columns resolved to indices in one table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityKey {
    indices: Vec<usize>,
}

impl IdentityKey {
    /// Resolve every identity column; the first absent one is a `MissingColumn` error.
    pub fn resolve(table: &FusionTable) -> Result<Self> {
        let indices = FusionColumn::IDENTITY_KEY
            .iter()
            .map(|c| table.require_column(c.header()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { indices })
    }

    /// Borrowed key tuple of one record
    pub fn of<'a>(&self, record: &'a FusionRecord) -> Vec<&'a str> {
        self.indices.iter().map(|&i| record.field(i)).collect()
    }
}

/// Numeric evidence value used for ranking.
///
/// Values that do not parse as a number (or parse to NaN) are `Unparsed` and
/// order below every numeric value.
#[derive(Debug, Clone, Copy)]
pub enum Support {
    Unparsed,
    Value(f64),
}

impl Support {
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(v) if !v.is_nan() => Support::Value(v),
            _ => Support::Unparsed,
        }
    }
}

impl Ord for Support {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Support::Unparsed, Support::Unparsed) => Ordering::Equal,
            (Support::Unparsed, Support::Value(_)) => Ordering::Less,
            (Support::Value(_), Support::Unparsed) => Ordering::Greater,
            (Support::Value(a), Support::Value(b)) => a.total_cmp(b),
        }
    }
}

impl PartialOrd for Support {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Support {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Support {}

/// (JunctionReadCount, SpanningFragCount) column indices for ranking.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceColumns {
    junction: usize,
    spanning: usize,
}

impl EvidenceColumns {
    pub fn resolve(table: &FusionTable) -> Result<Self> {
        Ok(Self {
            junction: table.require_column(FusionColumn::JunctionReadCount.header())?,
            spanning: table.require_column(FusionColumn::SpanningFragCount.header())?,
        })
    }

    pub fn support(&self, record: &FusionRecord) -> (Support, Support) {
        (
            Support::parse(record.field(self.junction)),
            Support::parse(record.field(self.spanning)),
        )
    }
}
