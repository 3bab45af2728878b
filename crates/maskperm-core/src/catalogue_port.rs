// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ports for element-type discovery and label localization.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::element::CatalogueItem;

/// Prefix marking a label as a localization key.
pub const LOCALIZATION_KEY_PREFIX: &str = "LLL:";

/// Error raised while listing the element catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Catalogue source could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Catalogue source is not valid JSON for the expected shape.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Source of every content-element type, MASK or not, including dividers.
pub trait CatalogueProvider {
    /// List raw catalogue items in display order.
    fn element_items(&self) -> Result<Vec<CatalogueItem>, CatalogueError>;
}

impl<T: CatalogueProvider + ?Sized> CatalogueProvider for &T {
    fn element_items(&self) -> Result<Vec<CatalogueItem>, CatalogueError> {
        (**self).element_items()
    }
}

/// Turns a raw catalogue label into display text. Must be side-effect free.
pub trait LabelResolver {
    /// Resolve `raw` to a display string.
    fn resolve(&self, raw: &str) -> String;
}

impl<T: LabelResolver + ?Sized> LabelResolver for &T {
    fn resolve(&self, raw: &str) -> String {
        (**self).resolve(raw)
    }
}

/// Resolver that returns labels unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughLabels;

impl LabelResolver for PassthroughLabels {
    fn resolve(&self, raw: &str) -> String {
        raw.to_owned()
    }
}

/// Resolver backed by a key → text dictionary.
///
/// Only labels starting with `LLL:` are looked up. Unknown keys resolve to
/// the raw key so nothing renders blank.
#[derive(Debug, Clone, Default)]
pub struct DictionaryLabels {
    entries: BTreeMap<String, String>,
}

impl DictionaryLabels {
    /// Build from an existing dictionary.
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// True if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LabelResolver for DictionaryLabels {
    fn resolve(&self, raw: &str) -> String {
        if !raw.starts_with(LOCALIZATION_KEY_PREFIX) {
            return raw.to_owned();
        }
        self.entries
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_resolves_known_keys_only() {
        let mut map = BTreeMap::new();
        map.insert(
            "LLL:EXT:site/locallang.xlf:text".to_owned(),
            "Text block".to_owned(),
        );
        let labels = DictionaryLabels::new(map);
        assert_eq!(labels.resolve("LLL:EXT:site/locallang.xlf:text"), "Text block");
        assert_eq!(
            labels.resolve("LLL:EXT:site/locallang.xlf:missing"),
            "LLL:EXT:site/locallang.xlf:missing"
        );
        assert_eq!(labels.resolve("Plain"), "Plain");
    }

    #[test]
    fn plain_labels_bypass_the_dictionary() {
        let mut map = BTreeMap::new();
        map.insert("Plain".to_owned(), "Rewritten".to_owned());
        assert_eq!(DictionaryLabels::new(map).resolve("Plain"), "Plain");
    }
}
