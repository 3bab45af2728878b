// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Element catalogue and label dictionary read from JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use maskperm_core::{CatalogueError, CatalogueItem, CatalogueProvider, DictionaryLabels};
use serde::Deserialize;
use serde_json::Value;

/// Catalogue item in either of the two shapes the backend exports.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItem {
    /// `{ "label": "...", "value": "..." }`
    Keyed { label: String, value: String },
    /// `["label", "value", ...]`; trailing entries (icons, groups) are ignored.
    Positional(Vec<Value>),
}

impl RawItem {
    fn into_item(self, index: usize) -> Result<CatalogueItem, CatalogueError> {
        match self {
            RawItem::Keyed { label, value } => Ok(CatalogueItem::new(value, label)),
            RawItem::Positional(parts) => match (parts.first(), parts.get(1)) {
                (Some(Value::String(label)), Some(Value::String(value))) => {
                    Ok(CatalogueItem::new(value.clone(), label.clone()))
                }
                _ => Err(CatalogueError::Other(format!(
                    "catalogue item {index} must start with [label, value]"
                ))),
            },
        }
    }
}

/// Catalogue read from a JSON array on every call.
pub struct FsCatalogue {
    path: PathBuf,
}

impl FsCatalogue {
    /// Catalogue backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogueProvider for FsCatalogue {
    fn element_items(&self) -> Result<Vec<CatalogueItem>, CatalogueError> {
        let bytes = fs::read(&self.path)?;
        let raw: Vec<RawItem> = serde_json::from_slice(&bytes)?;
        raw.into_iter()
            .enumerate()
            .map(|(index, item)| item.into_item(index))
            .collect()
    }
}

/// Load a `{ "LLL:...": "text" }` dictionary. A missing file yields an empty one.
pub fn load_labels(path: &Path) -> Result<DictionaryLabels, CatalogueError> {
    match fs::read(path) {
        Ok(bytes) => {
            let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes)?;
            Ok(DictionaryLabels::new(entries))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(DictionaryLabels::default()),
        Err(err) => Err(CatalogueError::Io(err)),
    }
}
