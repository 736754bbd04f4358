//! JSON-lines review dataset loader
//!
//! Each line is a JSON object with optional `reviewID` and `reviewText`
//! fields. Lines that fail to parse are skipped. Missing IDs are replaced
//! with generated `GENID_<n>` values that never collide with an earlier ID.

use crate::{CliError, Result};
use revtree_core::Record;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Prefix of generated review IDs
pub const GENERATED_ID_PREFIX: &str = "GENID_";

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(rename = "reviewID", default)]
    review_id: Option<String>,
    #[serde(rename = "reviewText", default)]
    review_text: Option<String>,
}

/// Records read from a dataset, plus how many lines were rejected
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Accepted records in file order
    pub records: Vec<Record>,
    /// Lines that were not valid review objects
    pub skipped: usize,
}

impl Dataset {
    /// Number of accepted records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no record was accepted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a dataset from a JSON-lines file
#[instrument]
pub fn load_reviews(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|source| CliError::DatasetOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_reviews(BufReader::new(file))?;
    info!(
        records = dataset.len(),
        skipped = dataset.skipped,
        "loaded reviews from {}",
        path.display()
    );
    Ok(dataset)
}

/// Parse JSON-lines reviews from any reader
pub fn parse_reviews<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut dataset = Dataset::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut counter: usize = 1;

    // A line that is not valid UTF-8 is skipped like any other bad line
    for (line_no, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
        let raw: RawReview = match serde_json::from_slice(line) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(line = line_no + 1, error = %e, "skipping unparsable line");
                dataset.skipped += 1;
                continue;
            }
        };

        let mut id = raw
            .review_id
            .unwrap_or_else(|| format!("{}{}", GENERATED_ID_PREFIX, counter));
        while seen.contains(&id) {
            id = format!("{}{}", GENERATED_ID_PREFIX, counter);
            counter += 1;
        }

        let text = raw.review_text.as_deref().map(trim_text).unwrap_or_default();

        seen.insert(id.clone());
        dataset.records.push(Record::new(id, text));
        counter += 1;
    }

    Ok(dataset)
}

fn trim_text(text: &str) -> String {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .to_string()
}
