//! Filament materials and the catalog they are offered from.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigError;

/// A printable material with its price and density.
///
/// Profiles are validated on construction and cannot change afterwards.
///
/// # Example
///
/// ```
/// use print_quote::MaterialProfile;
///
/// let pla = MaterialProfile::pla();
/// assert_eq!(pla.name(), "PLA");
/// assert_eq!(pla.price_per_gram(), 0.15);
/// assert_eq!(pla.density_g_per_cm3(), 1.25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialProfile {
    name: String,
    price_per_gram: f64,
    density_g_per_cm3: f64,
}

impl MaterialProfile {
    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the name is blank or the
    /// price or density is not a finite positive number.
    pub fn new(
        name: impl Into<String>,
        price_per_gram: f64,
        density_g_per_cm3: f64,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::invalid("material name", "must not be empty"));
        }
        if !(price_per_gram.is_finite() && price_per_gram > 0.0) {
            return Err(ConfigError::invalid(
                format!("{name}.price_per_gram"),
                format!("must be a positive number, got {price_per_gram}"),
            ));
        }
        if !(density_g_per_cm3.is_finite() && density_g_per_cm3 > 0.0) {
            return Err(ConfigError::invalid(
                format!("{name}.density_g_per_cm3"),
                format!("must be a positive number, got {density_g_per_cm3}"),
            ));
        }
        Ok(Self {
            name,
            price_per_gram,
            density_g_per_cm3,
        })
    }

    /// Polylactic acid: 0.15 €/g, 1.25 g/cm³.
    #[must_use]
    pub fn pla() -> Self {
        Self::builtin("PLA", 0.15, 1.25)
    }

    /// PETG: 0.22 €/g, 1.27 g/cm³.
    #[must_use]
    pub fn petg() -> Self {
        Self::builtin("PETG", 0.22, 1.27)
    }

    /// Polycarbonate: 0.30 €/g, 1.20 g/cm³.
    #[must_use]
    pub fn pc() -> Self {
        Self::builtin("PC", 0.30, 1.20)
    }

    fn builtin(name: &str, price_per_gram: f64, density_g_per_cm3: f64) -> Self {
        Self {
            name: name.to_string(),
            price_per_gram,
            density_g_per_cm3,
        }
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price in euros per gram.
    #[must_use]
    pub const fn price_per_gram(&self) -> f64 {
        self.price_per_gram
    }

    /// Density in g/cm³.
    #[must_use]
    pub const fn density_g_per_cm3(&self) -> f64 {
        self.density_g_per_cm3
    }
}

/// The set of materials an estimator can quote.
///
/// Iteration is ordered by name. Lookup tries the exact name first and
/// then an ASCII case-insensitive match.
///
/// # Example
///
/// ```
/// use print_quote::MaterialCatalog;
///
/// let catalog = MaterialCatalog::default();
/// assert_eq!(catalog.len(), 3);
/// assert_eq!(catalog.get("petg").unwrap().name(), "PETG");
/// assert!(catalog.get("ABS").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, MaterialProfile>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::from_iter([
            MaterialProfile::pla(),
            MaterialProfile::petg(),
            MaterialProfile::pc(),
        ])
    }
}

impl FromIterator<MaterialProfile> for MaterialCatalog {
    /// Later profiles replace earlier ones with the same name.
    fn from_iter<I: IntoIterator<Item = MaterialProfile>>(iter: I) -> Self {
        let materials = iter
            .into_iter()
            .map(|profile| (profile.name.clone(), profile))
            .collect();
        Self { materials }
    }
}

impl MaterialCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            materials: BTreeMap::new(),
        }
    }

    /// Add a material, replacing any existing one with the same name.
    #[must_use]
    pub fn with_material(mut self, profile: MaterialProfile) -> Self {
        self.materials.insert(profile.name.clone(), profile);
        self
    }

    /// Find a material by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MaterialProfile> {
        self.materials.get(name).or_else(|| {
            self.materials
                .values()
                .find(|profile| profile.name.eq_ignore_ascii_case(name))
        })
    }

    /// Number of materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// No materials at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterate over the materials in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MaterialProfile> {
        self.materials.values()
    }

    /// Material names joined for error messages.
    #[must_use]
    pub fn names(&self) -> String {
        self.materials
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
