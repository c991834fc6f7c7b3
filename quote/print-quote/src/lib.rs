//! Weight and price estimation for 3D print quotes.
//!
//! A customer picks a material and an infill density and uploads a model.
//! The [`Estimator`] measures the model's volume and turns it into an
//! estimated filament weight and price:
//!
//! ```text
//! fill   = infill / 100 + wall overhead
//! weight = volume (cm³) × density × fill
//! price  = max(minimum price, weight × price per gram)
//! ```
//!
//! Model files are decoded with `mesh-io` and checked for a closed,
//! positive-volume solid with `mesh-solid`. Coordinates are taken to be
//! millimeters.
//!
//! # Example
//!
//! ```
//! use print_quote::{Estimator, QuoteError};
//!
//! let estimator = Estimator::default();
//!
//! let quote = estimator.estimate(10.0, "PETG", 15).unwrap();
//! assert!(quote.minimum_applied());
//! assert_eq!(quote.price_cents(), 500);
//!
//! let err = estimator.estimate(10.0, "PETG", 50).unwrap_err();
//! assert!(matches!(err, QuoteError::InvalidInput { .. }));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod catalog;
mod config;
mod error;
mod estimate;
mod infill;

pub use catalog::{MaterialCatalog, MaterialProfile};
pub use config::{
    DEFAULT_MINIMUM_PRICE_EUR, DEFAULT_WALL_OVERHEAD, GeometryConfig, MaterialSettings,
    PricingConfig, QuoteConfig,
};
pub use error::{ConfigError, QuoteError, QuoteResult};
pub use estimate::{Estimator, PriceQuote, PrintRequest};
pub use infill::Infill;

// Re-exported so callers can name formats and solid options without
// depending on the mesh crates directly.
pub use mesh_io::MeshFormat;
pub use mesh_solid::SolidOptions;
