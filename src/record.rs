use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// One book as written to the output file.
///
/// Field order matches the JSON key order. Absent listing fields serialize as `null`;
/// `image` and `publication_date` are empty strings until enrichment fills them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub image: String,
    pub publication_date: String,
    /// Source rating on a 0-100 scale.
    pub rating: Option<u32>,
    pub ratings_count: Option<u64>,
}

/// Writes the records as a pretty-printed JSON array, replacing any existing file.
pub fn write_books_json(path: &Path, records: &[BookRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records).context("serialize book records")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
