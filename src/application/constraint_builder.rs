// Diet constraint construction
// Translates catalog and targets into the generic constraint representation

use crate::dataset::{DietTargets, FoodCatalog, FoodGroup, Nutrient, ServingBounds};
use crate::domain::{
    errors::ConfigurationError,
    models::{Constraint, NonlinearFunction, Objective, Problem, Variable},
};

/// Builds the canonical diet constraint set
///
/// Constraints come out in a fixed order with stable names:
///
/// 1. `budget`
/// 2. to 4. `protein_min`, `carbohydrate_min`, `fat_min`
/// 5. to 7. `protein_max`, `carbohydrate_max`, `fat_max`
/// 8. to 12. `group_<name>` (only with [`with_food_groups`](Self::with_food_groups))
/// 13. `max_cv` (only with [`with_max_cv`](Self::with_max_cv))
#[derive(Debug, Clone)]
pub struct ConstraintBuilder<'a> {
    catalog: &'a FoodCatalog,
    targets: &'a DietTargets,
    food_groups: bool,
    max_cv: Option<f64>,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(catalog: &'a FoodCatalog, targets: &'a DietTargets) -> Self {
        Self {
            catalog,
            targets,
            food_groups: false,
            max_cv: None,
        }
    }

    /// Toggle the per-group minimum servings constraints
    pub fn with_food_groups(mut self, enabled: bool) -> Self {
        self.food_groups = enabled;
        self
    }

    /// Set or clear the coefficient-of-variation ceiling
    pub fn with_max_cv(mut self, max_cv: Option<f64>) -> Self {
        self.max_cv = max_cv;
        self
    }

    pub fn build(&self) -> Result<Vec<Constraint>, ConfigurationError> {
        self.targets.validate()?;

        let mut constraints = Vec::with_capacity(13);
        constraints.push(Constraint::less_than(
            "budget",
            self.catalog.costs(),
            self.targets.budget,
        ));
        for nutrient in Nutrient::ALL {
            constraints.push(Constraint::greater_than(
                format!("{}_min", nutrient.name()),
                self.catalog.nutrient(nutrient),
                self.targets.range(nutrient).min,
            ));
        }
        for nutrient in Nutrient::ALL {
            constraints.push(Constraint::less_than(
                format!("{}_max", nutrient.name()),
                self.catalog.nutrient(nutrient),
                self.targets.range(nutrient).max,
            ));
        }

        if self.food_groups {
            for group in FoodGroup::ALL {
                constraints.push(Constraint::greater_than(
                    format!("group_{}", group.name()),
                    self.catalog.group_indicator(group),
                    self.targets.min_servings_per_group,
                ));
            }
        }

        if let Some(ceiling) = self.max_cv {
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(ConfigurationError::InvalidTarget(format!(
                    "coefficient of variation ceiling must be a non-negative number, got {}",
                    ceiling
                )));
            }
            constraints.push(Constraint::nonlinear(
                "max_cv",
                NonlinearFunction::CoefficientOfVariation,
                None,
                Some(ceiling),
            ));
        }

        Ok(constraints)
    }

    /// Total greenhouse-gas impact of the servings
    pub fn objective(&self) -> Objective {
        Objective::linear(self.catalog.ghg_impacts())
    }

    /// One serving-count variable per catalog item
    pub fn variables(&self, bounds: ServingBounds) -> Vec<Variable> {
        self.catalog
            .items()
            .iter()
            .map(|item| Variable::serving(item.name.clone()).with_bounds(bounds.min, bounds.max))
            .collect()
    }

    /// The complete diet problem under the current toggles
    pub fn problem(&self, bounds: ServingBounds) -> Result<Problem, ConfigurationError> {
        Problem::new(self.variables(bounds), self.objective(), self.build()?)
            .map(|p| p.with_name("eco-diet"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::EvaluationError;
    use approx::assert_relative_eq;

    fn names(constraints: &[Constraint]) -> Vec<&str> {
        constraints.iter().map(Constraint::name).collect()
    }

    /// Satisfies budget and nutrient ranges of the sample targets
    fn feasible_servings() -> Vec<f64> {
        let mut x = vec![0.0; 11];
        x[2] = 181.0 / 34.0;
        x[5] = 11.0;
        x
    }

    #[test]
    fn default_set_is_budget_and_nutrients() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let constraints = ConstraintBuilder::new(&catalog, &targets).build().unwrap();
        assert_eq!(constraints.len(), 7);
        assert_eq!(
            names(&constraints),
            vec![
                "budget",
                "protein_min",
                "carbohydrate_min",
                "fat_min",
                "protein_max",
                "carbohydrate_max",
                "fat_max"
            ]
        );
        assert!(constraints.iter().all(Constraint::is_linear));
    }

    #[test]
    fn optional_groups_extend_the_default_set() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let builder = ConstraintBuilder::new(&catalog, &targets);

        let with_groups = builder.clone().with_food_groups(true).build().unwrap();
        assert_eq!(with_groups.len(), 12);
        assert_eq!(with_groups[7].name(), "group_fruits");
        assert_eq!(with_groups[11].name(), "group_meat");

        let with_cv = builder.clone().with_max_cv(Some(1.0)).build().unwrap();
        assert_eq!(with_cv.len(), 8);
        assert!(!with_cv[7].is_linear());

        let everything = builder.with_food_groups(true).with_max_cv(Some(1.0)).build().unwrap();
        assert_eq!(everything.len(), 13);
        assert_eq!(everything[12].name(), "max_cv");
    }

    #[test]
    fn feasible_vector_has_non_negative_margins() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let problem = ConstraintBuilder::new(&catalog, &targets)
            .with_max_cv(Some(3.0))
            .problem(ServingBounds::default())
            .unwrap();
        let statuses = problem.evaluate_constraints(&feasible_servings()).unwrap();
        assert_eq!(statuses.len(), 8);
        for status in &statuses {
            assert!(status.margin >= -1e-9, "{} margin {}", status.name, status.margin);
        }
        assert!(problem.is_feasible(&feasible_servings()).unwrap());
    }

    #[test]
    fn overspending_gives_negative_budget_margin() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let budget = &ConstraintBuilder::new(&catalog, &targets).build().unwrap()[0];

        let mut x = feasible_servings();
        assert!(budget.margin(&x).unwrap() >= 0.0);
        x[9] += 20.0;
        assert!(budget.margin(&x).unwrap() < 0.0);
        assert!(!budget.is_satisfied(&x).unwrap());
    }

    #[test]
    fn shrinking_servings_never_tightens_budget() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let budget = &ConstraintBuilder::new(&catalog, &targets).build().unwrap()[0];

        let x = feasible_servings();
        let base = budget.margin(&x).unwrap();
        for k in [0.1, 0.5, 0.9, 0.99] {
            let scaled: Vec<f64> = x.iter().map(|v| v * k).collect();
            assert!(budget.margin(&scaled).unwrap() >= base);
        }
    }

    #[test]
    fn constant_impact_objective_is_scaled_sum() {
        let c = 0.37;
        let items = FoodCatalog::sample()
            .items()
            .iter()
            .cloned()
            .map(|mut item| {
                item.ghg_impact = c;
                item
            })
            .collect();
        let catalog = FoodCatalog::new(items).unwrap();
        let targets = DietTargets::sample();
        let problem = ConstraintBuilder::new(&catalog, &targets)
            .problem(ServingBounds::default())
            .unwrap();

        let x: Vec<f64> = (0..11).map(|i| i as f64 * 0.5).collect();
        let total: f64 = x.iter().sum();
        assert_relative_eq!(problem.evaluate_objective(&x).unwrap(), c * total, epsilon = 1e-12);
    }

    #[test]
    fn problem_names_variables_after_foods() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let bounds = ServingBounds {
            min: 0.0,
            max: Some(10.0),
        };
        let problem = ConstraintBuilder::new(&catalog, &targets).problem(bounds).unwrap();
        assert_eq!(problem.num_variables(), 11);
        assert_eq!(problem.variables()[3].name, "Milk");
        assert_eq!(problem.variables()[3].upper_bound, Some(10.0));
        assert_eq!(problem.name, "eco-diet");
        assert!(problem.is_linear());
    }

    #[test]
    fn dispersion_constraint_rejects_zero_servings() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let constraints = ConstraintBuilder::new(&catalog, &targets)
            .with_max_cv(Some(1.0))
            .build()
            .unwrap();
        assert_eq!(
            constraints[7].value(&[0.0; 11]),
            Err(EvaluationError::UndefinedDispersion)
        );
    }

    #[test]
    fn rejects_invalid_targets() {
        let catalog = FoodCatalog::sample();
        let mut targets = DietTargets::sample();
        targets.protein.min = 500.0;
        assert!(matches!(
            ConstraintBuilder::new(&catalog, &targets).build(),
            Err(ConfigurationError::InvalidTarget(_))
        ));

        let targets = DietTargets::sample();
        assert!(ConstraintBuilder::new(&catalog, &targets)
            .with_max_cv(Some(f64::NAN))
            .build()
            .is_err());
    }

    #[test]
    fn malformed_serving_bounds_fail_at_construction() {
        let catalog = FoodCatalog::sample();
        let targets = DietTargets::sample();
        let bounds = ServingBounds {
            min: 5.0,
            max: Some(1.0),
        };
        assert!(matches!(
            ConstraintBuilder::new(&catalog, &targets).problem(bounds),
            Err(ConfigurationError::InvalidBounds { index: 0, .. })
        ));
    }
}
