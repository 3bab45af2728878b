// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage port for backend groups and their allow-lists.

use thiserror::Error;

use crate::group::{AllowList, Group, GroupId};

/// Error type for permission store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Persisted permission field could not be understood.
    #[error("malformed permission field for group {group}: {reason}")]
    Malformed {
        /// Group whose field is broken.
        group: GroupId,
        /// What was wrong.
        reason: String,
    },
    /// Group disappeared between lookup and access.
    #[error("group {0} vanished from the store")]
    Vanished(GroupId),
    /// Backend refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Backend group storage, as far as the engine needs it.
///
/// Implementations own the persistence format and must serialize writes to
/// a single group record (last write wins). Entries in the permission field
/// that are not element types belong to other subsystems and must survive a
/// [`write_allow_list`](Self::write_allow_list).
pub trait PermissionStore {
    /// Every group, in a stable order.
    fn find_all_groups(&self) -> Result<Vec<Group>, StoreError>;
    /// Look up one group; `Ok(None)` when it does not exist.
    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError>;
    /// Current element-type allow-list of `group`.
    fn read_allow_list(&self, group: &Group) -> Result<AllowList, StoreError>;
    /// Replace the element-type allow-list of `group`.
    fn write_allow_list(&self, group: &Group, allow_list: &AllowList) -> Result<(), StoreError>;
}

impl<T: PermissionStore + ?Sized> PermissionStore for &T {
    fn find_all_groups(&self) -> Result<Vec<Group>, StoreError> {
        (**self).find_all_groups()
    }

    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        (**self).find_group_by_id(id)
    }

    fn read_allow_list(&self, group: &Group) -> Result<AllowList, StoreError> {
        (**self).read_allow_list(group)
    }

    fn write_allow_list(&self, group: &Group, allow_list: &AllowList) -> Result<(), StoreError> {
        (**self).write_allow_list(group, allow_list)
    }
}
