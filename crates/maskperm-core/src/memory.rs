// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-process adapters: a fixed catalogue and a map-backed group store.
//!
//! Useful for embedding the engine next to another storage layer and for
//! tests. Single-threaded by construction (`RefCell`), matching the engine's
//! request-scoped model.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalogue_port::{CatalogueError, CatalogueProvider};
use crate::element::CatalogueItem;
use crate::group::{AllowList, Group, GroupId};
use crate::store_port::{PermissionStore, StoreError};

/// Catalogue returning a fixed list of items.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogue {
    items: Vec<CatalogueItem>,
}

impl StaticCatalogue {
    /// Wrap a list of items.
    pub fn new(items: Vec<CatalogueItem>) -> Self {
        Self { items }
    }
}

impl CatalogueProvider for StaticCatalogue {
    fn element_items(&self) -> Result<Vec<CatalogueItem>, CatalogueError> {
        Ok(self.items.clone())
    }
}

#[derive(Debug, Clone)]
struct Record {
    group: Group,
    allow_list: AllowList,
}

/// Group store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<GroupId, Record>>,
    failing_reads: RefCell<BTreeSet<GroupId>>,
    failing_writes: RefCell<BTreeSet<GroupId>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add (or replace) a group with an initial allow-list.
    pub fn with_group<I, T>(self, id: u32, title: &str, allow_list: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let group = Group::new(id, title);
        self.records.borrow_mut().insert(
            group.id,
            Record {
                group,
                allow_list: allow_list.into_iter().collect(),
            },
        );
        self
    }

    /// Make every subsequent allow-list read of `id` fail. The group itself
    /// stays listed.
    pub fn fail_reads_for(&self, id: GroupId) {
        self.failing_reads.borrow_mut().insert(id);
    }

    /// Make every subsequent write to `id` fail.
    pub fn fail_writes_for(&self, id: GroupId) {
        self.failing_writes.borrow_mut().insert(id);
    }

    /// Snapshot of a group's allow-list.
    pub fn allow_list(&self, id: GroupId) -> Option<AllowList> {
        self.records
            .borrow()
            .get(&id)
            .map(|r| r.allow_list.clone())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl PermissionStore for MemoryStore {
    fn find_all_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .records
            .borrow()
            .values()
            .map(|r| r.group.clone())
            .collect())
    }

    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.records.borrow().get(&id).map(|r| r.group.clone()))
    }

    fn read_allow_list(&self, group: &Group) -> Result<AllowList, StoreError> {
        if self.failing_reads.borrow().contains(&group.id) {
            return Err(StoreError::Other(format!(
                "reads from group {} are disabled",
                group.id
            )));
        }
        self.records
            .borrow()
            .get(&group.id)
            .map(|r| r.allow_list.clone())
            .ok_or(StoreError::Vanished(group.id))
    }

    fn write_allow_list(&self, group: &Group, allow_list: &AllowList) -> Result<(), StoreError> {
        if self.failing_writes.borrow().contains(&group.id) {
            return Err(StoreError::Rejected(format!(
                "writes to group {} are disabled",
                group.id
            )));
        }
        let mut records = self.records.borrow_mut();
        let record = records
            .get_mut(&group.id)
            .ok_or(StoreError::Vanished(group.id))?;
        record.allow_list = allow_list.clone();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
