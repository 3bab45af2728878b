// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem adapters for maskperm (uses the platform data dir by default).
//!
//! A data directory holds:
//! - `maskperm.json`: engine settings ([`FsConfigStore`])
//! - `groups.json`: group records ([`FsGroupStore`])
//! - `catalogue.json`: element catalogue ([`FsCatalogue`])
//! - `labels.json`: optional label dictionary ([`load_labels`])

pub mod catalogue;
pub mod field;
pub mod groups;

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use maskperm_core::config::{ConfigError, ConfigStore};

pub use catalogue::{load_labels, FsCatalogue};
pub use field::{check_identifier, FieldError, PermissionField};
pub use groups::{FsGroupStore, GroupRow};

/// File name of the group records.
pub const GROUPS_FILE: &str = "groups.json";
/// File name of the element catalogue.
pub const CATALOGUE_FILE: &str = "catalogue.json";
/// File name of the label dictionary.
pub const LABELS_FILE: &str = "labels.json";

/// Resolve the platform data directory (e.g., `~/.local/share/maskperm`).
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from("org", "hov", "maskperm")
        .ok_or_else(|| ConfigError::Other("could not resolve data dir".into()))?;
    Ok(proj.data_dir().to_path_buf())
}

/// Directory holding every maskperm file.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use the platform data directory.
    pub fn platform() -> Result<Self, ConfigError> {
        default_data_dir().map(Self::new)
    }

    /// Root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Group store inside this directory.
    pub fn group_store(&self) -> FsGroupStore {
        FsGroupStore::new(self.root.join(GROUPS_FILE))
    }

    /// Catalogue inside this directory.
    pub fn catalogue(&self) -> FsCatalogue {
        FsCatalogue::new(self.root.join(CATALOGUE_FILE))
    }

    /// Path of the label dictionary.
    pub fn labels_path(&self) -> PathBuf {
        self.root.join(LABELS_FILE)
    }

    /// Settings store inside this directory.
    pub fn config_store(&self) -> FsConfigStore {
        FsConfigStore {
            base: self.root.clone(),
        }
    }
}

/// Write `data` to `path` through a uniquely named sibling that is renamed
/// into place. The sibling is removed if either step fails.
pub(crate) fn replace_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(data)?;
    staged.persist(path)?;
    Ok(())
}

/// Settings blobs kept as `<key>.json` files in the data directory.
///
/// Keys are plain file stems; anything that could escape the directory is
/// refused.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    fn blob_path(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let plain = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(ConfigError::Invalid(format!("settings key '{key}'")));
        }
        Ok(self.base.join(key).with_extension("json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.blob_path(key)?).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        replace_file(&self.blob_path(key)?, data).map_err(ConfigError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_replace_leaves_no_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("groups.json");
        fs::create_dir(&target).unwrap();

        assert!(replace_file(&target, b"[]").is_err());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["groups.json"]);
    }

    #[test]
    fn settings_keys_stay_inside_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataDir::new(dir.path()).config_store();
        for key in ["", "../escape", "a/b", "a.b"] {
            assert!(
                matches!(store.save_raw(key, b"{}"), Err(ConfigError::Invalid(_))),
                "{key:?}"
            );
        }
        store.save_raw("maskperm", b"{}").unwrap();
        assert_eq!(store.load_raw("maskperm").unwrap(), b"{}");
        assert!(matches!(store.load_raw("other"), Err(ConfigError::NotFound)));
    }
}
