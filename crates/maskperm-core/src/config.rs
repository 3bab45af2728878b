// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine settings and the storage port they are loaded through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical key under which engine settings are stored.
pub const ENGINE_CONFIG_KEY: &str = "maskperm";

/// Default reserved prefix for MASK element identifiers.
pub const DEFAULT_RESERVED_PREFIX: &str = "mask_";

/// Default divider sentinel used by the element catalogue to separate sections.
pub const DEFAULT_DIVIDER: &str = "--div--";

/// Storage port for raw settings blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Settings parsed but are unusable.
    #[error("invalid settings: {0}")]
    Invalid(String),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Naming conventions the engine uses to pick its elements out of the shared catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifiers starting with this prefix are owned by the engine.
    pub reserved_prefix: String,
    /// Catalogue entries with this exact value are section dividers, not elements.
    pub divider: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_owned(),
            divider: DEFAULT_DIVIDER.to_owned(),
        }
    }
}

impl EngineConfig {
    /// True if `identifier` belongs to the engine's permission domain.
    pub fn is_in_scope(&self, identifier: &str) -> bool {
        identifier.starts_with(&self.reserved_prefix)
    }

    /// True if `value` is the catalogue's divider sentinel.
    pub fn is_divider(&self, value: &str) -> bool {
        value == self.divider
    }

    /// Reject settings that would put every identifier in scope.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reserved_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "reserved_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`EngineConfig`] through a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load engine settings, falling back to defaults when none are stored.
    pub fn load_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let bytes = match self.store.load_raw(ENGINE_CONFIG_KEY) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(EngineConfig::default()),
            Err(e) => return Err(e),
        };
        if bytes.is_empty() {
            return Ok(EngineConfig::default());
        }
        let config: EngineConfig = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and persist engine settings.
    pub fn save_engine_config(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let data = serde_json::to_vec_pretty(config)?;
        self.store.save_raw(ENGINE_CONFIG_KEY, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        blobs: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl ConfigStore for MapStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.blobs
                .borrow()
                .get(key)
                .cloned()
                .ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.blobs.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_config_yields_defaults() {
        let service = ConfigService::new(MapStore::default());
        let config = service.load_engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.reserved_prefix, "mask_");
        assert_eq!(config.divider, "--div--");
    }

    #[test]
    fn partial_config_keeps_defaults_for_absent_fields() {
        let store = MapStore::default();
        store
            .save_raw(ENGINE_CONFIG_KEY, br#"{"reserved_prefix":"ce_"}"#)
            .unwrap();
        let config = ConfigService::new(store).load_engine_config().unwrap();
        assert_eq!(config.reserved_prefix, "ce_");
        assert_eq!(config.divider, DEFAULT_DIVIDER);
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let service = ConfigService::new(MapStore::default());
        let config = EngineConfig {
            reserved_prefix: String::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            service.save_engine_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let service = ConfigService::new(MapStore::default());
        let config = EngineConfig {
            reserved_prefix: "x_".into(),
            divider: "---".into(),
        };
        service.save_engine_config(&config).unwrap();
        assert_eq!(service.load_engine_config().unwrap(), config);
    }

    #[test]
    fn scope_and_divider_checks() {
        let config = EngineConfig::default();
        assert!(config.is_in_scope("mask_text"));
        assert!(!config.is_in_scope("std_header"));
        assert!(!config.is_in_scope("textmask_"));
        assert!(config.is_divider("--div--"));
        assert!(!config.is_divider("mask_div"));
    }
}
