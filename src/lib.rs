//! Filtering and per-sample merging of FusionInspector coding-effect fusion tables.
//!
//! Each input table is loaded verbatim ([`input`]), optionally reduced to
//! in-frame calls ([`fusion::filter`]), and folded into a per-sample group
//! ([`fusion::merge`]) that is deduplicated on the fusion-call identity
//! columns and ranked by junction reads, then spanning fragments.

pub mod config;
pub mod errors;
pub mod fusion;
pub mod input;
pub mod output;
pub mod pipeline;

pub use errors::{FusionError, Result};
