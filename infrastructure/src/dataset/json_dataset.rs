//! JSON and JSON-lines dataset files.
//!
//! A file is either one JSON array of records or one record per line:
//!
//! ```json
//! {"query": "Should cities ban cars?", "documents": [["passage", "passage"], ["passage"]]}
//! ```
//!
//! Records are parsed when the file is opened; an item whose query is blank
//! or that has no documents is reported when it is requested, so one bad
//! record fails only its own item.

use mods_application::ports::dataset::{Dataset, DatasetError, DatasetItem};
use mods_domain::{Document, Query};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
struct RawItem {
    query: String,
    documents: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct JsonDataset {
    name: String,
    items: Vec<RawItem>,
}

impl JsonDataset {
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: location.clone(),
            message: e.to_string(),
        })?;
        let items = Self::parse(&content, &location)?;
        let name = name.into();
        debug!("Loaded {} items for dataset {} from {}", items.len(), name, location);
        Ok(Self { name, items })
    }

    fn parse(content: &str, path: &str) -> Result<Vec<RawItem>, DatasetError> {
        if content.trim_start().starts_with('[') {
            return serde_json::from_str(content).map_err(|e| DatasetError::Parse {
                path: path.to_string(),
                record: 0,
                message: e.to_string(),
            });
        }

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line, text)| {
                serde_json::from_str(text).map_err(|e| DatasetError::Parse {
                    path: path.to_string(),
                    record: line + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl Dataset for JsonDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn get_item(&self, index: usize) -> Result<DatasetItem, DatasetError> {
        let raw = self.items.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        let query = Query::try_new(raw.query.as_str()).ok_or_else(|| DatasetError::InvalidItem {
            index,
            reason: "query is empty".to_string(),
        })?;
        if raw.documents.is_empty() {
            return Err(DatasetError::InvalidItem {
                index,
                reason: "item has no documents".to_string(),
            });
        }
        Ok(DatasetItem::new(
            query,
            Document::collection(raw.documents.clone()),
        ))
    }
}
