//! Element catalog: the UI elements a player can test and the true effect of
//! each variant on the site's conversion rate.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::GameError;

/// Variant name to conversion-rate delta for a single element.
pub type VariantTable = BTreeMap<String, f64>;

/// Read-only table of elements and their variants.
///
/// Loaded once at startup and shared across every session. Nothing mutates a
/// catalog after [`ElementCatalog::validate`] accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ElementCatalog {
    elements: BTreeMap<String, VariantTable>,
}

static DEFAULT_CATALOG: OnceLock<ElementCatalog> = OnceLock::new();

impl ElementCatalog {
    /// The catalog shipped with the game.
    #[must_use]
    pub fn builtin() -> &'static Self {
        DEFAULT_CATALOG.get_or_init(|| {
            Self::from_entries([
                ("button_color", "red", 0.01),
                ("button_color", "green", -0.005),
                ("headline", "Limited Offer", 0.02),
                ("headline", "Exclusive Deal", 0.015),
                ("image", "image2", 0.005),
                ("image", "image3", -0.01),
            ])
        })
    }

    /// Build a catalog from `(element, variant, delta)` triples.
    #[must_use]
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let mut elements: BTreeMap<String, VariantTable> = BTreeMap::new();
        for (element, variant, delta) in entries {
            elements
                .entry(element.to_string())
                .or_default()
                .insert(variant.to_string(), delta);
        }
        Self { elements }
    }

    /// Parse and validate a catalog from JSON of the shape
    /// `{"element": {"variant": delta}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that the catalog can drive a game.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog is empty, an element has no
    /// variants, or a delta is not a finite value within `[-1, 1]`.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.elements.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (element, variants) in &self.elements {
            if variants.is_empty() {
                return Err(CatalogError::NoVariants {
                    element: element.clone(),
                });
            }
            for (variant, delta) in variants {
                if !delta.is_finite() || !(-1.0..=1.0).contains(delta) {
                    return Err(CatalogError::InvalidDelta {
                        element: element.clone(),
                        variant: variant.clone(),
                        delta: *delta,
                    });
                }
            }
        }
        Ok(())
    }

    /// Conversion-rate delta for `element`/`variant`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownElement` or `GameError::UnknownVariant` when
    /// the pair is not part of the catalog.
    pub fn delta(&self, element: &str, variant: &str) -> Result<f64, GameError> {
        let variants = self
            .elements
            .get(element)
            .ok_or_else(|| GameError::UnknownElement {
                element: element.to_string(),
            })?;
        variants
            .get(variant)
            .copied()
            .ok_or_else(|| GameError::UnknownVariant {
                element: element.to_string(),
                variant: variant.to_string(),
            })
    }

    #[must_use]
    pub fn contains(&self, element: &str, variant: &str) -> bool {
        self.delta(element, variant).is_ok()
    }

    /// Iterate elements in name order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &VariantTable)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Variant names of `element`, in name order.
    #[must_use]
    pub fn variants(&self, element: &str) -> Vec<&str> {
        self.elements
            .get(element)
            .map(|variants| variants.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog contains no elements")]
    Empty,
    #[error("element {element} has no variants")]
    NoVariants { element: String },
    #[error("variant {element}.{variant} has invalid delta {delta}")]
    InvalidDelta {
        element: String,
        variant: String,
        delta: f64,
    },
}
