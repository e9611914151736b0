// Budget and nutrition targets
// All figures are daily; longer horizons go through DietTargets::over, never implicit scaling

use crate::dataset::catalog::Nutrient;
use crate::domain::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` range for a nutrient total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientRange {
    pub min: f64,
    pub max: f64,
}

impl NutrientRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn scaled(self, factor: f64) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }
}

/// Planning horizon the targets apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeHorizon {
    Daily,
    Days(u32),
}

impl TimeHorizon {
    pub fn days(&self) -> u32 {
        match self {
            TimeHorizon::Daily => 1,
            TimeHorizon::Days(n) => *n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietTargets {
    pub budget: f64,
    pub protein: NutrientRange,
    pub carbohydrate: NutrientRange,
    pub fat: NutrientRange,
    /// Minimum total servings per food group when group constraints are enabled
    pub min_servings_per_group: f64,
}

impl DietTargets {
    /// Reference daily targets: budget 15, protein 82–136 g, carbohydrate
    /// 225–325 g, fat 44–78 g, at least 3 servings per food group
    pub fn sample() -> Self {
        Self {
            budget: 15.0,
            protein: NutrientRange::new(82.0, 136.0),
            carbohydrate: NutrientRange::new(225.0, 325.0),
            fat: NutrientRange::new(44.0, 78.0),
            min_servings_per_group: 3.0,
        }
    }

    pub fn range(&self, nutrient: Nutrient) -> NutrientRange {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrate => self.carbohydrate,
            Nutrient::Fat => self.fat,
        }
    }

    /// Daily targets scaled to cover `horizon`
    pub fn over(&self, horizon: TimeHorizon) -> Self {
        let factor = f64::from(horizon.days());
        Self {
            budget: self.budget * factor,
            protein: self.protein.scaled(factor),
            carbohydrate: self.carbohydrate.scaled(factor),
            fat: self.fat.scaled(factor),
            min_servings_per_group: self.min_servings_per_group * factor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(ConfigurationError::InvalidTarget(format!(
                "budget must be a non-negative number, got {}",
                self.budget
            )));
        }
        for nutrient in Nutrient::ALL {
            let range = self.range(nutrient);
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(ConfigurationError::InvalidTarget(format!(
                    "{} range ({}, {}) is malformed",
                    nutrient.name(),
                    range.min,
                    range.max
                )));
            }
        }
        if !self.min_servings_per_group.is_finite() || self.min_servings_per_group < 0.0 {
            return Err(ConfigurationError::InvalidTarget(format!(
                "minimum servings per group must be non-negative, got {}",
                self.min_servings_per_group
            )));
        }
        Ok(())
    }
}

/// Per-item serving bounds applied to every decision variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingBounds {
    pub min: f64,
    /// `None` leaves servings unbounded above
    pub max: Option<f64>,
}

impl Default for ServingBounds {
    fn default() -> Self {
        Self { min: 0.0, max: None }
    }
}
