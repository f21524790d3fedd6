//! JSON Schema for the merge summary

use std::sync::LazyLock;

use schemars::schema_for;

use super::types::MergeSummary;

/// Cached JSON Schema for MergeSummary.
static SCHEMA: LazyLock<schemars::Schema> = LazyLock::new(|| schema_for!(MergeSummary));

/// Returns the JSON Schema as a pretty-printed JSON string.
pub fn schema_json_pretty() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&*SCHEMA)
}
