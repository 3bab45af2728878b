// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content-element types and the filtered catalogue built from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Raw catalogue entry as delivered by a [`CatalogueProvider`](crate::CatalogueProvider).
///
/// `label` may be a localization key; it is resolved separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueItem {
    /// Element-type identifier (or the divider sentinel).
    pub value: String,
    /// Raw label.
    pub label: String,
}

impl CatalogueItem {
    /// Create an item.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Assignable element type owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementType {
    /// Identifier carrying the reserved prefix.
    pub identifier: String,
    /// Display label. Never compared.
    pub label: String,
}

/// Ordered, deduplicated set of in-scope element types.
///
/// Rebuilt from the provider on every engine call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalogue {
    entries: Vec<ElementType>,
}

impl Catalogue {
    /// Drop divider entries and out-of-scope identifiers; first occurrence of
    /// a duplicate identifier wins.
    pub fn from_items<I>(items: I, config: &EngineConfig) -> Self
    where
        I: IntoIterator<Item = CatalogueItem>,
    {
        let mut seen = HashSet::new();
        let entries = items
            .into_iter()
            .filter(|item| !config.is_divider(&item.value))
            .filter(|item| config.is_in_scope(&item.value))
            .filter(|item| seen.insert(item.value.clone()))
            .map(|item| ElementType {
                identifier: item.value,
                label: item.label,
            })
            .collect();
        Self { entries }
    }

    /// Element types in catalogue order.
    pub fn entries(&self) -> &[ElementType] {
        &self.entries
    }

    /// Identifiers in catalogue order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    /// Number of element types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no element type is in scope.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite every label through `resolve`.
    pub fn map_labels<F>(self, mut resolve: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        let entries = self
            .entries
            .into_iter()
            .map(|e| ElementType {
                label: resolve(&e.label),
                identifier: e.identifier,
            })
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dividers_and_foreign_types_are_dropped() {
        let items = vec![
            CatalogueItem::new("--div--", "Standard"),
            CatalogueItem::new("header", "Header"),
            CatalogueItem::new("--div--", "Mask"),
            CatalogueItem::new("mask_text", "Text"),
            CatalogueItem::new("mask_gallery", "Gallery"),
        ];
        let cat = Catalogue::from_items(items, &EngineConfig::default());
        let ids: Vec<&str> = cat.identifiers().collect();
        assert_eq!(ids, vec!["mask_text", "mask_gallery"]);
    }

    #[test]
    fn duplicates_keep_first_label() {
        let items = vec![
            CatalogueItem::new("mask_text", "First"),
            CatalogueItem::new("mask_text", "Second"),
        ];
        let cat = Catalogue::from_items(items, &EngineConfig::default());
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.entries()[0].label, "First");
    }

    #[test]
    fn custom_divider_is_honoured() {
        let config = EngineConfig {
            divider: "mask_---".into(),
            ..EngineConfig::default()
        };
        let items = vec![
            CatalogueItem::new("mask_---", "Section"),
            CatalogueItem::new("mask_text", "Text"),
        ];
        let cat = Catalogue::from_items(items, &config);
        assert_eq!(cat.identifiers().collect::<Vec<_>>(), vec!["mask_text"]);
    }

    #[test]
    fn labels_are_rewritten_in_place() {
        let items = vec![CatalogueItem::new("mask_text", "lll")];
        let cat = Catalogue::from_items(items, &EngineConfig::default())
            .map_labels(|raw| raw.to_uppercase());
        assert_eq!(cat.entries()[0].label, "LLL");
        assert_eq!(cat.entries()[0].identifier, "mask_text");
    }
}
