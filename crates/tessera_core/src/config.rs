//! # World Configuration
//!
//! Limits for a [`World`](crate::World), loaded once at startup from TOML.
//!
//! ```toml
//! max_entities = 100000
//! ```

use serde::Deserialize;

use crate::ecs::INVALID_INDEX;
use crate::error::{EcsError, EcsResult};

/// Default maximum number of entities a world can hold.
pub const DEFAULT_MAX_ENTITIES: usize = 1_000_000;

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Maximum number of simultaneously allocated entity slots.
    ///
    /// Every component pool reserves storage for this many components the
    /// first time its type is attached.
    pub max_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration with the given entity limit.
    #[must_use]
    pub const fn with_max_entities(max_entities: usize) -> Self {
        Self { max_entities }
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML,
    /// contains unknown keys, or fails [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the limits are usable.
    ///
    /// The entity limit must be non-zero and must keep every slot index below
    /// the sentinel index.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] describing the violated limit.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".to_owned(),
            ));
        }
        if self.max_entities > INVALID_INDEX as usize {
            return Err(EcsError::InvalidConfig(format!(
                "max_entities must not exceed {INVALID_INDEX}"
            )));
        }
        Ok(())
    }
}
