// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Backend user groups and their element-type allow-lists.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::element::Catalogue;

/// Stable identifier of a backend user group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GroupId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Group record as seen by the engine. The allow-list stays in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group id.
    pub id: GroupId,
    /// Human-readable title (presentation only).
    pub title: String,
}

impl Group {
    /// Create a group record.
    pub fn new(id: impl Into<GroupId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Set of element-type identifiers a group may use.
///
/// Ordered so that persisted output and reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(BTreeSet<String>);

impl AllowList {
    /// Empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `identifier` is allowed.
    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    /// Add an identifier; returns false if it was already present.
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        self.0.insert(identifier.into())
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if every identifier in `self` is also in `other`.
    pub fn is_subset(&self, other: &AllowList) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Identifiers owned by the engine (reserved prefix).
    pub fn in_scope(&self, config: &EngineConfig) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|id| config.is_in_scope(id))
            .cloned()
            .collect()
    }

    /// Catalogue identifiers this allow-list is missing.
    pub fn deficit<'a>(&self, catalogue: &'a Catalogue) -> Vec<&'a str> {
        catalogue
            .identifiers()
            .filter(|id| !self.contains(id))
            .collect()
    }

    /// Auto mode: union with every catalogue identifier.
    pub fn merged_with(&self, catalogue: &Catalogue) -> AllowList {
        let mut merged = self.clone();
        for id in catalogue.identifiers() {
            merged.insert(id);
        }
        merged
    }

    /// Explicit mode: in-scope entries become exactly the in-scope part of
    /// `selected`; everything else is kept as is.
    pub fn with_selection<I, T>(&self, selected: I, config: &EngineConfig) -> AllowList
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut next: BTreeSet<String> = self
            .0
            .iter()
            .filter(|id| !config.is_in_scope(id))
            .cloned()
            .collect();
        next.extend(
            selected
                .into_iter()
                .map(|id| id.as_ref().to_owned())
                .filter(|id| config.is_in_scope(id)),
        );
        AllowList(next)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a AllowList {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::CatalogueItem;

    fn catalogue(values: &[&str]) -> Catalogue {
        let items = values.iter().map(|v| CatalogueItem::new(*v, *v));
        Catalogue::from_items(items, &EngineConfig::default())
    }

    #[test]
    fn deficit_lists_missing_catalogue_entries_in_catalogue_order() {
        let list: AllowList = ["mask_text"].into_iter().collect();
        let cat = catalogue(&["mask_text", "mask_gallery", "mask_accordion"]);
        assert_eq!(list.deficit(&cat), vec!["mask_gallery", "mask_accordion"]);
    }

    #[test]
    fn merge_keeps_unrelated_entries() {
        let list: AllowList = ["header", "mask_text"].into_iter().collect();
        let merged = list.merged_with(&catalogue(&["mask_gallery"]));
        let got: Vec<&str> = merged.iter().collect();
        assert_eq!(got, vec!["header", "mask_gallery", "mask_text"]);
    }

    #[test]
    fn selection_replaces_only_reserved_entries() {
        let config = EngineConfig::default();
        let list: AllowList = ["header", "mask_text", "mask_gallery"].into_iter().collect();
        let next = list.with_selection(["mask_gallery", "mask_new", "bullets"], &config);
        let got: Vec<&str> = next.iter().collect();
        assert_eq!(got, vec!["header", "mask_gallery", "mask_new"]);
    }

    #[test]
    fn empty_selection_clears_reserved_entries() {
        let config = EngineConfig::default();
        let list: AllowList = ["header", "mask_text"].into_iter().collect();
        let next = list.with_selection(Vec::<String>::new(), &config);
        assert!(next.in_scope(&config).is_empty());
        assert!(next.contains("header"));
    }

    #[test]
    fn group_id_displays_as_number() {
        assert_eq!(GroupId(42).to_string(), "42");
    }
}
