// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reconciliation engine: staleness checks and allow-list rewrites.
//!
//! The engine is stateless. Every call re-reads the catalogue and the store,
//! so nothing cached can go stale between administrative actions.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalogue_port::{CatalogueError, CatalogueProvider, LabelResolver};
use crate::config::EngineConfig;
use crate::element::Catalogue;
use crate::group::{AllowList, Group, GroupId};
use crate::store_port::{PermissionStore, StoreError};

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A per-group operation named a group the store does not know.
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    /// Reading from the permission store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// The element catalogue could not be listed.
    #[error("catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),
}

/// What [`ReconciliationEngine::reconcile`] should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    /// Merge the catalogue into every group.
    AllGroups,
    /// Merge the catalogue into one group.
    Group(GroupId),
    /// Replace one group's MASK entries with exactly `selected`.
    ///
    /// Identifiers outside the current catalogue are accepted; identifiers
    /// without the reserved prefix are ignored.
    Explicit {
        /// Target group.
        group: GroupId,
        /// New MASK portion of the allow-list (may be empty).
        selected: BTreeSet<String>,
    },
}

/// A group whose write (or read, during a bulk run) failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    /// Affected group.
    pub group: GroupId,
    /// Store error message.
    pub reason: String,
}

/// Outcome of a reconcile run.
///
/// Groups are processed independently: a failure never rolls back groups
/// already written in the same run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Groups whose allow-list was rewritten.
    pub updated: Vec<GroupId>,
    /// Groups that already matched the target allow-list (no write issued).
    pub unchanged: Vec<GroupId>,
    /// Groups that could not be reconciled.
    pub failed: Vec<GroupFailure>,
}

impl ReconcileReport {
    /// True iff no group failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record_failure(&mut self, group: GroupId, err: &StoreError) {
        self.failed.push(GroupFailure {
            group,
            reason: err.to_string(),
        });
    }
}

/// One row of the administration overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    /// Group id.
    pub id: GroupId,
    /// Group title.
    pub title: String,
    /// True if the group misses at least one catalogue element.
    pub needs_update: bool,
}

/// Per-group staleness plus the bulk-update toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    /// Every group in store order.
    pub groups: Vec<GroupStatus>,
    /// True if any group needs an update.
    pub can_update_all: bool,
}

/// Stateless service comparing group allow-lists with the element catalogue.
pub struct ReconciliationEngine<C, L, S> {
    config: EngineConfig,
    catalogue: C,
    labels: L,
    store: S,
}

impl<C, L, S> ReconciliationEngine<C, L, S> {
    /// Wire the engine to its collaborators.
    pub fn new(config: EngineConfig, catalogue: C, labels: L, store: S) -> Self {
        Self {
            config,
            catalogue,
            labels,
            store,
        }
    }

    /// Active naming conventions.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The permission store the engine writes to.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<C, L, S> ReconciliationEngine<C, L, S>
where
    C: CatalogueProvider,
    L: LabelResolver,
    S: PermissionStore,
{
    /// In-scope element types with display labels, in catalogue order.
    pub fn available_types(&self) -> Result<Catalogue, EngineError> {
        Ok(self.catalogue()?.map_labels(|raw| self.labels.resolve(raw)))
    }

    /// Whether `group` (or, with `None`, any group) misses catalogue elements.
    pub fn update_necessary(&self, group: Option<GroupId>) -> Result<bool, EngineError> {
        let catalogue = self.catalogue()?;
        match group {
            Some(id) => {
                let group = self.require_group(id)?;
                self.needs_update(&group, &catalogue)
            }
            None => {
                for group in self.store.find_all_groups()? {
                    if self.needs_update(&group, &catalogue)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// MASK identifiers currently enabled for `group`.
    pub fn selected_masks(&self, group: GroupId) -> Result<BTreeSet<String>, EngineError> {
        let group = self.require_group(group)?;
        let current = self.store.read_allow_list(&group)?;
        Ok(current.in_scope(&self.config))
    }

    /// Rewrite allow-lists according to `request`.
    ///
    /// Lookup and read errors for a named group are returned as errors;
    /// write failures are collected in the report.
    pub fn reconcile(&self, request: UpdateRequest) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::default();
        match request {
            UpdateRequest::AllGroups => {
                let catalogue = self.catalogue()?;
                let groups = self.store.find_all_groups()?;
                info!(
                    groups = groups.len(),
                    types = catalogue.len(),
                    "merging catalogue into every group"
                );
                for group in &groups {
                    match self.store.read_allow_list(group) {
                        Ok(current) => {
                            let next = current.merged_with(&catalogue);
                            self.persist(group, &current, &next, &mut report);
                        }
                        Err(err) => {
                            warn!(group = %group.id, error = %err, "skipping unreadable group");
                            report.record_failure(group.id, &err);
                        }
                    }
                }
            }
            UpdateRequest::Group(id) => {
                let catalogue = self.catalogue()?;
                let group = self.require_group(id)?;
                let current = self.store.read_allow_list(&group)?;
                let next = current.merged_with(&catalogue);
                self.persist(&group, &current, &next, &mut report);
            }
            UpdateRequest::Explicit { group, selected } => {
                let group = self.require_group(group)?;
                let ignored: Vec<&str> = selected
                    .iter()
                    .map(String::as_str)
                    .filter(|id| !self.config.is_in_scope(id))
                    .collect();
                if !ignored.is_empty() {
                    debug!(group = %group.id, ?ignored, "ignoring selections without reserved prefix");
                }
                let current = self.store.read_allow_list(&group)?;
                let next = current.with_selection(&selected, &self.config);
                self.persist(&group, &current, &next, &mut report);
            }
        }
        Ok(report)
    }

    /// Per-group staleness for every group, plus the bulk toggle.
    pub fn overview(&self) -> Result<Overview, EngineError> {
        let catalogue = self.catalogue()?;
        let mut groups = Vec::new();
        for group in self.store.find_all_groups()? {
            let needs_update = self.needs_update(&group, &catalogue)?;
            groups.push(GroupStatus {
                id: group.id,
                title: group.title,
                needs_update,
            });
        }
        let can_update_all = groups.iter().any(|g| g.needs_update);
        Ok(Overview {
            groups,
            can_update_all,
        })
    }

    fn catalogue(&self) -> Result<Catalogue, EngineError> {
        let items = self.catalogue.element_items()?;
        Ok(Catalogue::from_items(items, &self.config))
    }

    fn require_group(&self, id: GroupId) -> Result<Group, EngineError> {
        self.store
            .find_group_by_id(id)?
            .ok_or(EngineError::GroupNotFound(id))
    }

    fn needs_update(&self, group: &Group, catalogue: &Catalogue) -> Result<bool, EngineError> {
        let current = self.store.read_allow_list(group)?;
        let missing = current.deficit(catalogue);
        if missing.is_empty() {
            return Ok(false);
        }
        debug!(group = %group.id, ?missing, "allow-list behind catalogue");
        Ok(true)
    }

    fn persist(
        &self,
        group: &Group,
        current: &AllowList,
        next: &AllowList,
        report: &mut ReconcileReport,
    ) {
        if next == current {
            debug!(group = %group.id, "allow-list already current");
            report.unchanged.push(group.id);
            return;
        }
        match self.store.write_allow_list(group, next) {
            Ok(()) => {
                info!(
                    group = %group.id,
                    before = current.len(),
                    after = next.len(),
                    "allow-list written"
                );
                report.updated.push(group.id);
            }
            Err(err) => {
                warn!(group = %group.id, error = %err, "allow-list write failed");
                report.record_failure(group.id, &err);
            }
        }
    }
}
