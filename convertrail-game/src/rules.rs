//! Immutable rule set shared by every session on a server.
use thiserror::Error;

use crate::catalog::{CatalogError, ElementCatalog};
use crate::config::{ConfigError, GameConfig};

/// Economy configuration plus the element catalog.
///
/// Built once at process start and shared behind an `Arc`; sessions only ever
/// borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    config: GameConfig,
    catalog: ElementCatalog,
}

impl Rules {
    /// Validate and bundle a configuration and catalog.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if either part fails validation.
    pub fn new(config: GameConfig, catalog: ElementCatalog) -> Result<Self, RulesError> {
        config.validate()?;
        catalog.validate()?;
        Ok(Self { config, catalog })
    }

    /// Default economy with the built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            config: GameConfig::default(),
            catalog: ElementCatalog::builtin().clone(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid game config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid element catalog: {0}")]
    Catalog(#[from] CatalogError),
}
