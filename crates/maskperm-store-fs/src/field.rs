// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec for the group permission field (`explicit_allowdeny` style).
//!
//! The field is a comma-separated list. Element-type grants look like
//! `tt_content:CType:<identifier>`; older installs append `:ALLOW`. Every
//! other entry (other tables, `:DENY` entries) belongs to someone else and is
//! carried through untouched, except a `:DENY` for a type that is granted again.

use thiserror::Error;

/// Prefix of an element-type grant.
pub const CTYPE_ENTRY_PREFIX: &str = "tt_content:CType:";

const LEGACY_ALLOW: &str = "ALLOW";
const LEGACY_DENY: &str = "DENY";

/// Entry that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// `tt_content:CType:` with nothing after it.
    #[error("empty element type in entry '{0}'")]
    EmptyIdentifier(String),
    /// Trailing mode that is neither `ALLOW` nor `DENY`.
    #[error("unknown mode '{mode}' in entry '{entry}'")]
    UnknownMode {
        /// Offending entry.
        entry: String,
        /// Unrecognized mode.
        mode: String,
    },
    /// Identifier that cannot be written without breaking the field syntax.
    #[error("element type '{0}' cannot be stored in the permission field")]
    InvalidIdentifier(String),
}

/// Check that `identifier` survives a render/parse cycle as a single grant.
pub fn check_identifier(identifier: &str) -> Result<(), FieldError> {
    let clean = !identifier.is_empty()
        && identifier.trim() == identifier
        && !identifier.contains([',', ':']);
    if clean {
        Ok(())
    } else {
        Err(FieldError::InvalidIdentifier(identifier.to_owned()))
    }
}

fn denied_identifier(entry: &str) -> Option<&str> {
    match entry.strip_prefix(CTYPE_ENTRY_PREFIX)?.split_once(':') {
        Some((id, LEGACY_DENY)) => Some(id),
        _ => None,
    }
}

/// Parsed permission field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionField {
    element_types: Vec<String>,
    foreign: Vec<String>,
}

impl PermissionField {
    /// Parse a raw field value.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let mut field = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some(rest) = entry.strip_prefix(CTYPE_ENTRY_PREFIX) else {
                field.foreign.push(entry.to_owned());
                continue;
            };
            let identifier = match rest.split_once(':') {
                None => rest,
                Some((id, LEGACY_ALLOW)) => id,
                Some((_, LEGACY_DENY)) => {
                    field.foreign.push(entry.to_owned());
                    continue;
                }
                Some((_, mode)) => {
                    return Err(FieldError::UnknownMode {
                        entry: entry.to_owned(),
                        mode: mode.to_owned(),
                    })
                }
            };
            if identifier.is_empty() {
                return Err(FieldError::EmptyIdentifier(entry.to_owned()));
            }
            if !field.element_types.iter().any(|e| e == identifier) {
                field.element_types.push(identifier.to_owned());
            }
        }
        Ok(field)
    }

    /// Allowed element types, in field order.
    pub fn element_types(&self) -> &[String] {
        &self.element_types
    }

    /// Entries not owned by the element-type grant list, in field order.
    pub fn foreign_entries(&self) -> &[String] {
        &self.foreign
    }

    /// Replace the element-type grants.
    ///
    /// Grants already in the field keep their position; new ones are appended
    /// in iteration order. A foreign `:DENY` entry for a granted type is
    /// dropped. Nothing changes if any identifier fails [`check_identifier`].
    pub fn set_element_types<I, T>(&mut self, identifiers: I) -> Result<(), FieldError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let wanted: Vec<String> = identifiers.into_iter().map(Into::into).collect();
        for id in &wanted {
            check_identifier(id)?;
        }
        let mut granted: Vec<String> = self
            .element_types
            .iter()
            .filter(|id| wanted.contains(id))
            .cloned()
            .collect();
        for id in wanted {
            if !granted.contains(&id) {
                granted.push(id);
            }
        }
        self.foreign.retain(|entry| {
            denied_identifier(entry).is_none_or(|id| !granted.iter().any(|g| g == id))
        });
        self.element_types = granted;
        Ok(())
    }

    /// Render back to the field format: foreign entries first, then grants.
    pub fn render(&self) -> String {
        self.foreign
            .iter()
            .cloned()
            .chain(
                self.element_types
                    .iter()
                    .map(|id| format!("{CTYPE_ENTRY_PREFIX}{id}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}
