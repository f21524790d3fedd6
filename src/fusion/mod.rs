//! Fusion-call table operations: named columns, in-frame filtering and
//! per-sample merging.

pub mod columns;
pub mod filter;
pub mod merge;

pub use columns::{EvidenceColumns, FusionColumn, IdentityKey, Support};
pub use filter::{filter_by, filter_in_frame};
pub use merge::{
    dedup_records, derive_sample_key, merge_all, merge_group, rank_records, MergeStep,
    SampleGroup, SampleGroups,
};
