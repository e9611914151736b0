// Dataset module: read-only food reference data and diet targets

pub mod catalog;
pub mod targets;

pub use catalog::{FoodCatalog, FoodGroup, FoodItem, Nutrient};
pub use targets::{DietTargets, NutrientRange, ServingBounds, TimeHorizon};
