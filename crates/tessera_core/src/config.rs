//! # Registry Configuration
//!
//! Loaded once at startup, usually as a `[registry]` table of a larger TOML
//! file.
//!
//! ```toml
//! max_component_types = 32
//! initial_entity_capacity = 100
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default signature width.
pub const DEFAULT_MAX_COMPONENT_TYPES: usize = 32;

/// Default number of pre-sized entity slots per pool.
pub const DEFAULT_INITIAL_ENTITY_CAPACITY: usize = 100;

/// Sizing parameters of a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Signature width: maximum number of distinct component types.
    pub max_component_types: usize,
    /// Slots reserved up front in the signature table and in each new pool.
    pub initial_entity_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_component_types: DEFAULT_MAX_COMPONENT_TYPES,
            initial_entity_capacity: DEFAULT_INITIAL_ENTITY_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] on malformed TOML, unknown keys or
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_component_types == 0 {
            return Err(EcsError::InvalidConfig(
                "max_component_types must be at least 1".into(),
            ));
        }
        if self.initial_entity_capacity > u32::MAX as usize {
            return Err(EcsError::InvalidConfig(format!(
                "initial_entity_capacity {} exceeds u32::MAX",
                self.initial_entity_capacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_component_types, 32);
        assert_eq!(config.initial_entity_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegistryConfig::from_toml_str("max_component_types = 64").unwrap();
        assert_eq!(config.max_component_types, 64);
        assert_eq!(config.initial_entity_capacity, 100);
    }

    #[test]
    fn test_rejects_zero_width() {
        let err = RegistryConfig::from_toml_str("max_component_types = 0").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(RegistryConfig::from_toml_str("pool_size = 3").is_err());
    }
}
