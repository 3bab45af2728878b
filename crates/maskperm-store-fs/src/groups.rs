// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON-file group store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use maskperm_core::{AllowList, Group, GroupId, PermissionStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::PermissionField;
use crate::replace_file;

/// One group record as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Group id.
    pub uid: u32,
    /// Group title.
    pub title: String,
    /// Comma-separated permission field.
    #[serde(default)]
    pub explicit_allowdeny: String,
    /// Soft-deleted groups are invisible to the engine.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

/// Groups stored as a JSON array in a single file.
///
/// Every call re-reads the file. Writes replace it atomically (temporary
/// sibling + rename), so a concurrent reader sees either the old or the new
/// content; concurrent writers resolve as last-write-wins.
pub struct FsGroupStore {
    path: PathBuf,
}

impl FsGroupStore {
    /// Store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows, deleted ones included. A missing file holds no rows.
    pub fn load_rows(&self) -> Result<Vec<GroupRow>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// Replace the file contents with `rows`.
    pub fn save_rows(&self, rows: &[GroupRow]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(rows)?;
        replace_file(&self.path, &data)?;
        Ok(())
    }

    fn live_row(&self, id: GroupId) -> Result<Option<GroupRow>, StoreError> {
        Ok(self
            .load_rows()?
            .into_iter()
            .find(|row| row.uid == id.0 && !row.deleted))
    }
}

fn parse_field(row: &GroupRow) -> Result<PermissionField, StoreError> {
    PermissionField::parse(&row.explicit_allowdeny).map_err(|err| StoreError::Malformed {
        group: GroupId(row.uid),
        reason: err.to_string(),
    })
}

impl PermissionStore for FsGroupStore {
    fn find_all_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .load_rows()?
            .into_iter()
            .filter(|row| !row.deleted)
            .map(|row| Group::new(row.uid, row.title))
            .collect())
    }

    fn find_group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.live_row(id)?.map(|row| Group::new(row.uid, row.title)))
    }

    fn read_allow_list(&self, group: &Group) -> Result<AllowList, StoreError> {
        let row = self.live_row(group.id)?.ok_or(StoreError::Vanished(group.id))?;
        let field = parse_field(&row)?;
        Ok(field.element_types().iter().cloned().collect())
    }

    fn write_allow_list(&self, group: &Group, allow_list: &AllowList) -> Result<(), StoreError> {
        let mut rows = self.load_rows()?;
        let row = rows
            .iter_mut()
            .find(|row| row.uid == group.id.0 && !row.deleted)
            .ok_or(StoreError::Vanished(group.id))?;
        let mut field = parse_field(row)?;
        field
            .set_element_types(allow_list.iter())
            .map_err(|err| StoreError::Rejected(err.to_string()))?;
        row.explicit_allowdeny = field.render();
        debug!(group = %group.id, path = %self.path.display(), "rewriting permission field");
        self.save_rows(&rows)
    }
}
