//! The pricing estimator.

use std::fmt;
use std::path::Path;

use mesh_io::{MeshFormat, load_mesh, parse_mesh};
use mesh_solid::{SolidOptions, solid_volume};
use mesh_types::IndexedMesh;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{MaterialCatalog, MaterialProfile};
use crate::config::{PricingConfig, QuoteConfig};
use crate::error::{ConfigError, QuoteError, QuoteResult};
use crate::infill::Infill;

/// Cubic millimeters per cubic centimeter.
const MM3_PER_CM3: f64 = 1000.0;

/// A resolved pricing request.
///
/// Built per calculation by [`Estimator::request`]; the volume is always
/// finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRequest {
    volume_cm3: f64,
    material: MaterialProfile,
    infill: Infill,
}

impl PrintRequest {
    /// Create a request.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidGeometry`] if the volume is negative or
    /// not finite.
    pub fn new(volume_cm3: f64, material: MaterialProfile, infill: Infill) -> QuoteResult<Self> {
        if !(volume_cm3.is_finite() && volume_cm3 >= 0.0) {
            return Err(QuoteError::geometry(format!(
                "volume must be a finite non-negative number, got {volume_cm3} cm³"
            )));
        }
        Ok(Self {
            volume_cm3,
            material,
            infill,
        })
    }

    /// Model volume in cm³.
    #[must_use]
    pub const fn volume_cm3(&self) -> f64 {
        self.volume_cm3
    }

    /// Material to print with.
    #[must_use]
    pub const fn material(&self) -> &MaterialProfile {
        &self.material
    }

    /// Infill density.
    #[must_use]
    pub const fn infill(&self) -> Infill {
        self.infill
    }

    /// Infill as a fraction in `[0, 1]`.
    #[must_use]
    pub fn infill_fraction(&self) -> f64 {
        self.infill.fraction()
    }
}

/// Estimated weight and price of a print.
///
/// The price is never below the estimator's minimum price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    material: String,
    infill_percent: u8,
    volume_cm3: f64,
    estimated_weight_g: f64,
    raw_price_eur: f64,
    estimated_price_eur: f64,
    minimum_applied: bool,
}

impl PriceQuote {
    /// Name of the quoted material.
    #[must_use]
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Quoted infill percentage.
    #[must_use]
    pub const fn infill_percent(&self) -> u8 {
        self.infill_percent
    }

    /// Model volume in cm³.
    #[must_use]
    pub const fn volume_cm3(&self) -> f64 {
        self.volume_cm3
    }

    /// Estimated filament weight in grams.
    #[must_use]
    pub const fn estimated_weight_g(&self) -> f64 {
        self.estimated_weight_g
    }

    /// Price before the minimum was applied.
    #[must_use]
    pub const fn raw_price_eur(&self) -> f64 {
        self.raw_price_eur
    }

    /// Final price in euros.
    #[must_use]
    pub const fn estimated_price_eur(&self) -> f64 {
        self.estimated_price_eur
    }

    /// The minimum price replaced the computed one.
    #[must_use]
    pub const fn minimum_applied(&self) -> bool {
        self.minimum_applied
    }

    /// Final price rounded to whole cents.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn price_cents(&self) -> u64 {
        // Finite and non-negative by construction
        (self.estimated_price_eur * 100.0).round() as u64
    }

    /// Final price rounded to two decimals, for display.
    #[must_use]
    pub fn rounded_price_eur(&self) -> f64 {
        (self.estimated_price_eur * 100.0).round() / 100.0
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}% infill: {:.2} g, {:.2} EUR",
            self.material,
            self.infill_percent,
            self.estimated_weight_g,
            self.rounded_price_eur()
        )?;
        if self.minimum_applied {
            f.write_str(" (minimum price)")?;
        }
        Ok(())
    }
}

/// Turns volumes and model files into price quotes.
///
/// Holds the catalog and pricing parameters it was built with and never
/// changes afterwards, so one estimator can be shared across threads.
///
/// # Example
///
/// ```
/// use print_quote::Estimator;
///
/// let estimator = Estimator::default();
/// let quote = estimator.estimate(100.0, "PLA", 40).unwrap();
/// assert!((quote.estimated_weight_g() - 68.75).abs() < 1e-9);
/// assert_eq!(quote.price_cents(), 1031);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator {
    catalog: MaterialCatalog,
    pricing: PricingConfig,
    solid: SolidOptions,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            catalog: MaterialCatalog::default(),
            pricing: PricingConfig::default(),
            solid: SolidOptions::default(),
        }
    }
}

impl Estimator {
    /// Create an estimator over a catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing parameters are out of range.
    pub fn new(catalog: MaterialCatalog, pricing: PricingConfig) -> Result<Self, ConfigError> {
        pricing.validate()?;
        Ok(Self {
            catalog,
            pricing,
            solid: SolidOptions::default(),
        })
    }

    /// Create an estimator from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &QuoteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let estimator = Self::new(config.catalog()?, config.pricing)?
            .with_solid_options(config.geometry.solid_options());
        info!(
            materials = estimator.catalog.len(),
            wall_overhead = estimator.pricing.wall_overhead,
            minimum_price_eur = estimator.pricing.minimum_price_eur,
            "Estimator configured"
        );
        Ok(estimator)
    }

    /// Sets the solid-check options used for model files.
    #[must_use]
    pub const fn with_solid_options(mut self, solid: SolidOptions) -> Self {
        self.solid = solid;
        self
    }

    /// The material catalog.
    #[must_use]
    pub const fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// The pricing parameters.
    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Look up a material in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidInput`] if the catalog has no such material.
    pub fn material(&self, name: &str) -> QuoteResult<&MaterialProfile> {
        self.catalog.get(name).ok_or_else(|| {
            QuoteError::input(format!(
                "unknown material `{name}` (available: {})",
                self.catalog.names()
            ))
        })
    }

    /// Resolve names and percentages into a [`PrintRequest`].
    ///
    /// # Errors
    ///
    /// - [`QuoteError::InvalidInput`] for an unknown material or infill
    /// - [`QuoteError::InvalidGeometry`] for a negative or non-finite volume
    pub fn request(
        &self,
        volume_cm3: f64,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<PrintRequest> {
        let (profile, infill) = self.resolve(material, infill_percent)?;
        PrintRequest::new(volume_cm3, profile.clone(), infill)
    }

    fn resolve(
        &self,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<(&MaterialProfile, Infill)> {
        Ok((self.material(material)?, Infill::from_percent(infill_percent)?))
    }

    /// Price a resolved request.
    ///
    /// `weight = volume × density × (infill + wall overhead)`, priced per
    /// gram and raised to the minimum price if lower.
    #[must_use]
    pub fn estimate_request(&self, request: &PrintRequest) -> PriceQuote {
        let material = request.material();
        let effective_fill = request.infill_fraction() + self.pricing.wall_overhead;
        let weight_g = request.volume_cm3() * material.density_g_per_cm3() * effective_fill;
        let raw_price = weight_g * material.price_per_gram();
        let minimum_applied = raw_price < self.pricing.minimum_price_eur;
        let price = raw_price.max(self.pricing.minimum_price_eur);

        debug!(
            material = material.name(),
            infill = %request.infill(),
            volume_cm3 = request.volume_cm3(),
            weight_g,
            raw_price,
            price,
            minimum_applied,
            "Estimated print"
        );

        PriceQuote {
            material: material.name().to_string(),
            infill_percent: request.infill().percent(),
            volume_cm3: request.volume_cm3(),
            estimated_weight_g: weight_g,
            raw_price_eur: raw_price,
            estimated_price_eur: price,
            minimum_applied,
        }
    }

    /// Price a volume in cm³.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn estimate(
        &self,
        volume_cm3: f64,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<PriceQuote> {
        let request = self.request(volume_cm3, material, infill_percent)?;
        Ok(self.estimate_request(&request))
    }

    /// Measure a mesh in millimeters and return its volume in cm³.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidGeometry`] if the mesh is not a finite,
    /// positive-volume solid under the configured rules.
    pub fn measure_mesh(&self, mesh: IndexedMesh) -> QuoteResult<f64> {
        let solid = solid_volume(mesh, &self.solid)?;
        Ok(solid.volume / MM3_PER_CM3)
    }

    /// Price a mesh whose coordinates are in millimeters.
    ///
    /// # Errors
    ///
    /// Input errors are reported before the mesh is measured.
    pub fn quote_mesh(
        &self,
        mesh: IndexedMesh,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<PriceQuote> {
        let (profile, infill) = self.resolve(material, infill_percent)?;
        self.price_mesh(mesh, profile, infill)
    }

    fn price_mesh(
        &self,
        mesh: IndexedMesh,
        profile: &MaterialProfile,
        infill: Infill,
    ) -> QuoteResult<PriceQuote> {
        let volume_cm3 = self.measure_mesh(mesh)?;
        let request = PrintRequest::new(volume_cm3, profile.clone(), infill)?;
        Ok(self.estimate_request(&request))
    }

    /// Price an uploaded model held in memory.
    ///
    /// # Errors
    ///
    /// - [`QuoteError::InvalidInput`] for an unknown material or infill
    /// - [`QuoteError::InvalidGeometry`] if the bytes do not decode or the
    ///   mesh is not a closed solid
    pub fn quote_model(
        &self,
        bytes: &[u8],
        format: MeshFormat,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<PriceQuote> {
        let (profile, infill) = self.resolve(material, infill_percent)?;
        let mesh = parse_mesh(bytes, format)?;
        let quote = self.price_mesh(mesh, profile, infill)?;
        info!(%format, price_eur = quote.rounded_price_eur(), "Quoted model");
        Ok(quote)
    }

    /// Price a model file, detecting the format from its extension.
    ///
    /// # Errors
    ///
    /// As [`quote_model`](Self::quote_model); unreadable files and unknown
    /// extensions are geometry errors.
    pub fn quote_file<P: AsRef<Path>>(
        &self,
        path: P,
        material: &str,
        infill_percent: u32,
    ) -> QuoteResult<PriceQuote> {
        let path = path.as_ref();
        let (profile, infill) = self.resolve(material, infill_percent)?;
        let mesh = load_mesh(path)?;
        let quote = self.price_mesh(mesh, profile, infill)?;
        info!(path = %path.display(), price_eur = quote.rounded_price_eur(), "Quoted model");
        Ok(quote)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Vertex, cube};

    #[test]
    fn pla_forty_percent() {
        let quote = Estimator::default().estimate(100.0, "PLA", 40).unwrap();
        assert_relative_eq!(quote.estimated_weight_g(), 68.75, epsilon = 1e-9);
        assert_relative_eq!(quote.raw_price_eur(), 10.3125, epsilon = 1e-9);
        assert_relative_eq!(quote.estimated_price_eur(), 10.3125, epsilon = 1e-9);
        assert_relative_eq!(quote.rounded_price_eur(), 10.31, epsilon = 1e-9);
        assert!(!quote.minimum_applied());
        assert_eq!(quote.to_string(), "PLA at 40% infill: 68.75 g, 10.31 EUR");
    }

    #[test]
    fn small_petg_print_hits_minimum() {
        let quote = Estimator::default().estimate(10.0, "PETG", 15).unwrap();
        assert_relative_eq!(quote.estimated_weight_g(), 3.81, epsilon = 1e-9);
        assert_relative_eq!(quote.raw_price_eur(), 0.8382, epsilon = 1e-9);
        assert_relative_eq!(quote.estimated_price_eur(), 5.0);
        assert!(quote.minimum_applied());
        assert_eq!(quote.price_cents(), 500);
        assert!(quote.to_string().ends_with("5.00 EUR (minimum price)"));
    }

    #[test]
    fn zero_volume_costs_minimum() {
        let quote = Estimator::default().estimate(0.0, "PC", 100).unwrap();
        assert_relative_eq!(quote.estimated_weight_g(), 0.0);
        assert_relative_eq!(quote.estimated_price_eur(), 5.0);
    }

    #[test]
    fn unknown_material_is_invalid_input() {
        let err = Estimator::default().estimate(10.0, "ABS", 40).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));
        assert!(err.to_string().contains("PC, PETG, PLA"));
    }

    #[test]
    fn unoffered_infill_is_invalid_input() {
        let err = Estimator::default().estimate(10.0, "PLA", 50).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));
    }

    #[test]
    fn bad_volume_is_invalid_geometry() {
        let estimator = Estimator::default();
        for volume in [-1.0, f64::NAN, f64::INFINITY] {
            let err = estimator.estimate(volume, "PLA", 40).unwrap_err();
            assert!(matches!(err, QuoteError::InvalidGeometry { .. }), "{volume}");
        }
    }

    #[test]
    fn material_lookup_ignores_case() {
        let quote = Estimator::default().estimate(100.0, "pla", 40).unwrap();
        assert_eq!(quote.material(), "PLA");
    }

    #[test]
    fn custom_pricing_applies() {
        let pricing = PricingConfig::default()
            .with_wall_overhead(0.12)
            .with_minimum_price(0.0);
        let estimator = Estimator::new(MaterialCatalog::default(), pricing).unwrap();
        let quote = estimator.estimate(10.0, "PETG", 15).unwrap();
        // 10 * 1.27 * 0.27
        assert_relative_eq!(quote.estimated_weight_g(), 3.429, epsilon = 1e-9);
        assert!(!quote.minimum_applied());
    }

    #[test]
    fn invalid_pricing_rejected() {
        let pricing = PricingConfig::default().with_wall_overhead(2.0);
        assert!(Estimator::new(MaterialCatalog::default(), pricing).is_err());
    }

    #[test]
    fn request_keeps_resolved_values() {
        let request = Estimator::default().request(12.5, "petg", 70).unwrap();
        assert_eq!(request.material().name(), "PETG");
        assert_eq!(request.infill(), Infill::Strong);
        assert_relative_eq!(request.infill_fraction(), 0.7);
        assert_relative_eq!(request.volume_cm3(), 12.5);
    }

    #[test]
    fn ten_mm_cube_is_one_cubic_centimeter() {
        let quote = Estimator::default()
            .quote_mesh(cube(10.0), "PLA", 100)
            .unwrap();
        assert_relative_eq!(quote.volume_cm3(), 1.0, epsilon = 1e-12);
        // 1 * 1.25 * 1.15
        assert_relative_eq!(quote.estimated_weight_g(), 1.4375, epsilon = 1e-12);
    }

    #[test]
    fn open_mesh_is_invalid_geometry() {
        let triangle = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(10.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let err = Estimator::default()
            .quote_mesh(triangle, "PLA", 40)
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidGeometry { .. }));
    }

    #[test]
    fn model_quote_uses_catalog_name() {
        let mut bytes = Vec::new();
        mesh_io::write_stl(&cube(10.0), &mut bytes).unwrap();
        let quote = Estimator::default()
            .quote_model(&bytes, MeshFormat::Stl, "petg", 70)
            .unwrap();
        assert_eq!(quote.material(), "PETG");
        assert_eq!(quote.infill_percent(), 70);
    }

    #[test]
    fn input_errors_reported_before_geometry() {
        let err = Estimator::default()
            .quote_model(b"not a model", MeshFormat::Stl, "PLA", 50)
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));

        let err = Estimator::default()
            .quote_model(b"not a model", MeshFormat::Stl, "PLA", 40)
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidGeometry { .. }));
    }

    #[test]
    fn lenient_estimator_accepts_open_mesh() {
        let mut mesh = cube(10.0);
        mesh.faces.pop();
        let estimator = Estimator::default()
            .with_solid_options(SolidOptions::default().with_require_watertight(false));
        assert!(estimator.quote_mesh(mesh, "PLA", 40).is_ok());
    }

    #[test]
    fn estimator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Estimator>();
    }

    #[test]
    fn quote_serializes_to_json() {
        let quote = Estimator::default().estimate(100.0, "PLA", 40).unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["material"], "PLA");
        assert_eq!(json["infill_percent"], 40);
        assert_eq!(json["minimum_applied"], false);
    }
}
