//! Quote configuration.
//!
//! Loaded from JSON. Every section is optional:
//!
//! ```json
//! {
//!   "pricing": { "wall_overhead": 0.15, "minimum_price_eur": 5.0 },
//!   "geometry": { "require_watertight": true },
//!   "materials": {
//!     "PLA": { "price_per_gram": 0.15, "density_g_per_cm3": 1.25 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use mesh_solid::SolidOptions;
use serde::{Deserialize, Serialize};

use crate::catalog::{MaterialCatalog, MaterialProfile};
use crate::error::ConfigError;

/// Default fill added on top of the infill for walls and shells.
pub const DEFAULT_WALL_OVERHEAD: f64 = 0.15;

/// Default floor price in euros.
pub const DEFAULT_MINIMUM_PRICE_EUR: f64 = 5.0;

/// Pricing parameters.
///
/// # Example
///
/// ```
/// use print_quote::PricingConfig;
///
/// let pricing = PricingConfig::default().with_wall_overhead(0.12);
/// assert_eq!(pricing.wall_overhead, 0.12);
/// assert_eq!(pricing.minimum_price_eur, 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Fraction added to the infill fraction for walls and shells.
    pub wall_overhead: f64,

    /// Lowest price ever quoted, in euros.
    pub minimum_price_eur: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            wall_overhead: DEFAULT_WALL_OVERHEAD,
            minimum_price_eur: DEFAULT_MINIMUM_PRICE_EUR,
        }
    }
}

impl PricingConfig {
    /// Sets the wall overhead.
    #[must_use]
    pub const fn with_wall_overhead(mut self, wall_overhead: f64) -> Self {
        self.wall_overhead = wall_overhead;
        self
    }

    /// Sets the minimum price.
    #[must_use]
    pub const fn with_minimum_price(mut self, minimum_price_eur: f64) -> Self {
        self.minimum_price_eur = minimum_price_eur;
        self
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the wall overhead is outside
    /// `[0, 1]` or the minimum price is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.wall_overhead) {
            return Err(ConfigError::invalid(
                "pricing.wall_overhead",
                format!("must be between 0 and 1, got {}", self.wall_overhead),
            ));
        }
        if !(self.minimum_price_eur.is_finite() && self.minimum_price_eur >= 0.0) {
            return Err(ConfigError::invalid(
                "pricing.minimum_price_eur",
                format!("must be zero or more, got {}", self.minimum_price_eur),
            ));
        }
        Ok(())
    }
}

/// Geometry acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Reject meshes with holes or non-manifold edges.
    pub require_watertight: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            require_watertight: true,
        }
    }
}

impl GeometryConfig {
    /// Solid-check options for these rules.
    #[must_use]
    pub fn solid_options(&self) -> SolidOptions {
        SolidOptions::default().with_require_watertight(self.require_watertight)
    }
}

/// Price and density of one configured material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialSettings {
    /// Euros per gram.
    pub price_per_gram: f64,
    /// Grams per cubic centimeter.
    pub density_g_per_cm3: f64,
}

impl From<&MaterialProfile> for MaterialSettings {
    fn from(profile: &MaterialProfile) -> Self {
        Self {
            price_per_gram: profile.price_per_gram(),
            density_g_per_cm3: profile.density_g_per_cm3(),
        }
    }
}

/// Complete estimator configuration.
///
/// # Example
///
/// ```
/// use print_quote::QuoteConfig;
///
/// let config = QuoteConfig::from_json_str(r#"{ "pricing": { "minimum_price_eur": 3.5 } }"#).unwrap();
/// assert_eq!(config.pricing.minimum_price_eur, 3.5);
/// assert_eq!(config.pricing.wall_overhead, 0.15);
/// assert_eq!(config.materials.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuoteConfig {
    /// Pricing parameters.
    pub pricing: PricingConfig,

    /// Geometry acceptance rules.
    pub geometry: GeometryConfig,

    /// Materials keyed by name. Replaces the built-in catalog when given.
    pub materials: BTreeMap<String, MaterialSettings>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        let materials = MaterialCatalog::default()
            .iter()
            .map(|profile| (profile.name().to_string(), MaterialSettings::from(profile)))
            .collect();
        Self {
            pricing: PricingConfig::default(),
            geometry: GeometryConfig::default(),
            materials,
        }
    }
}

impl QuoteConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or on any
    /// [`from_json_str`](Self::from_json_str) error.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the material catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if any material has an invalid name, price or density.
    pub fn catalog(&self) -> Result<MaterialCatalog, ConfigError> {
        self.materials
            .iter()
            .map(|(name, settings)| {
                MaterialProfile::new(
                    name.as_str(),
                    settings.price_per_gram,
                    settings.density_g_per_cm3,
                )
            })
            .collect()
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()?;
        if self.materials.is_empty() {
            return Err(ConfigError::invalid(
                "materials",
                "at least one material is required",
            ));
        }
        self.catalog().map(|_| ())
    }
}
