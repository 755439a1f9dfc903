//! CSV intake for survey item exports from the record store.
//!
//! Only structural problems fail an import. Row-level data problems (blank id,
//! unparseable date, unknown category) are logged and left for the engine to
//! degrade, so the report can still say why an item is missing.

mod normalizer;
mod parser;

use super::domain::{ItemId, SurveyableItem};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ItemImportError {
    #[error("failed to read survey item export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid survey item CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub struct SurveyItemImporter;

impl SurveyItemImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SurveyableItem>, ItemImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SurveyableItem>, ItemImportError> {
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut items = Vec::new();

        for record in parser::parse_records(reader)? {
            if !seen.insert(record.item.id.clone()) {
                warn!(
                    line = record.line,
                    item_id = %record.item.id,
                    "duplicate survey item id, keeping first occurrence"
                );
                continue;
            }

            items.push(record.item);
        }

        Ok(items)
    }
}

/// Drop later items whose id was already seen, keeping the first occurrence.
///
/// For batches assembled from more than one source.
pub fn retain_first_by_id(items: &mut Vec<SurveyableItem>) {
    let mut seen: HashSet<ItemId> = HashSet::new();
    items.retain(|item| {
        let first = seen.insert(item.id.clone());
        if !first {
            warn!(item_id = %item.id, "duplicate survey item id, keeping first occurrence");
        }
        first
    });
}
