// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Permission reconciliation for MASK content elements.
//!
//! Backend user groups carry an allow-list of content-element types. MASK
//! elements (identifiers starting with a reserved prefix, `mask_` by default)
//! appear in the element catalogue whenever a new element is defined, and the
//! allow-lists fall behind. [`ReconciliationEngine`] detects that drift and
//! rewrites allow-lists, either by merging the whole catalogue in (auto mode)
//! or by replacing the MASK portion with an explicit selection.
//!
//! Storage and catalogue discovery stay behind ports ([`PermissionStore`],
//! [`CatalogueProvider`], [`LabelResolver`]) so adapters remain thin and
//! framework-agnostic.

pub mod catalogue_port;
pub mod config;
pub mod element;
pub mod engine;
pub mod group;
pub mod memory;
pub mod store_port;

pub use catalogue_port::{
    CatalogueError, CatalogueProvider, DictionaryLabels, LabelResolver, PassthroughLabels,
};
pub use config::{ConfigError, ConfigService, ConfigStore, EngineConfig};
pub use element::{Catalogue, CatalogueItem, ElementType};
pub use engine::{
    EngineError, GroupFailure, GroupStatus, Overview, ReconcileReport, ReconciliationEngine,
    UpdateRequest,
};
pub use group::{AllowList, Group, GroupId};
pub use store_port::{PermissionStore, StoreError};
