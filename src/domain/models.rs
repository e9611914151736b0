use super::dispersion::coefficient_of_variation;
use super::errors::{ConfigurationError, EvaluationError};
use super::value_objects::{Direction, Method, SolutionStatus, FEASIBILITY_TOLERANCE, TOLERANCE};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Decision variable in an optimization problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub lower_bound: f64,
    /// `None` means the variable is unbounded above
    pub upper_bound: Option<f64>,
}

impl Variable {
    /// A non-negative, unbounded serving count
    pub fn serving(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_bound: 0.0,
            upper_bound: None,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Project a value into the variable's bounds
    pub fn clamp(&self, value: f64) -> f64 {
        let value = value.max(self.lower_bound);
        match self.upper_bound {
            Some(upper) => value.min(upper),
            None => value,
        }
    }
}

/// A pure scalar function of the decision vector
#[derive(Clone)]
pub struct Evaluator(Arc<dyn Fn(&[f64]) -> Result<f64, EvaluationError> + Send + Sync>);

impl Evaluator {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, EvaluationError> + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }

    pub fn call(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        (self.0)(x)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Evaluator(<fn>)")
    }
}

/// Objective function to minimize
#[derive(Debug, Clone)]
pub enum Objective {
    /// Weighted sum of the decision variables
    Linear(Vec<f64>),
    /// Arbitrary deterministic function of the decision vector
    Custom(Evaluator),
}

impl Objective {
    pub fn linear(coefficients: Vec<f64>) -> Self {
        Objective::Linear(coefficients)
    }

    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, EvaluationError> + Send + Sync + 'static,
    {
        Objective::Custom(Evaluator::new(function))
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Objective::Linear(_))
    }

    /// Coefficients of a linear objective
    pub fn coefficients(&self) -> Option<&[f64]> {
        match self {
            Objective::Linear(coefficients) => Some(coefficients),
            Objective::Custom(_) => None,
        }
    }

    pub fn evaluate(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        let value = match self {
            Objective::Linear(coefficients) => dot(coefficients, x),
            Objective::Custom(evaluator) => evaluator.call(x)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFiniteValue("objective".to_string()))
        }
    }
}

/// Scalar function bounded by a nonlinear constraint
#[derive(Debug, Clone)]
pub enum NonlinearFunction {
    /// Population standard deviation over mean of the decision vector
    CoefficientOfVariation,
    Custom(Evaluator),
}

impl NonlinearFunction {
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        match self {
            NonlinearFunction::CoefficientOfVariation => coefficient_of_variation(x),
            NonlinearFunction::Custom(evaluator) => evaluator.call(x),
        }
    }
}

/// Constraint on the decision vector
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `coefficients · x (direction) bound`
    Linear {
        name: String,
        coefficients: Vec<f64>,
        bound: f64,
        direction: Direction,
    },
    /// `lower <= function(x) <= upper`, either side may be absent
    Nonlinear {
        name: String,
        function: NonlinearFunction,
        lower: Option<f64>,
        upper: Option<f64>,
    },
}

impl Constraint {
    pub fn less_than(name: impl Into<String>, coefficients: Vec<f64>, bound: f64) -> Self {
        Constraint::Linear {
            name: name.into(),
            coefficients,
            bound,
            direction: Direction::LessThanOrEqual,
        }
    }

    pub fn greater_than(name: impl Into<String>, coefficients: Vec<f64>, bound: f64) -> Self {
        Constraint::Linear {
            name: name.into(),
            coefficients,
            bound,
            direction: Direction::GreaterThanOrEqual,
        }
    }

    pub fn nonlinear(
        name: impl Into<String>,
        function: NonlinearFunction,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Self {
        Constraint::Nonlinear {
            name: name.into(),
            function,
            lower,
            upper,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Constraint::Linear { name, .. } | Constraint::Nonlinear { name, .. } => name,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Constraint::Linear { .. })
    }

    /// The `(lower, upper)` interval the constraint value must lie in
    pub fn interval(&self) -> (Option<f64>, Option<f64>) {
        match self {
            Constraint::Linear {
                bound, direction, ..
            } => match direction {
                Direction::LessThanOrEqual => (None, Some(*bound)),
                Direction::GreaterThanOrEqual => (Some(*bound), None),
            },
            Constraint::Nonlinear { lower, upper, .. } => (*lower, *upper),
        }
    }

    /// Raw constraint value at `x`
    pub fn value(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        let value = match self {
            Constraint::Linear { coefficients, .. } => dot(coefficients, x),
            Constraint::Nonlinear { function, .. } => function.evaluate(x)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFiniteValue(format!(
                "constraint '{}'",
                self.name()
            )))
        }
    }

    /// Normalized margin, non-negative when the constraint holds
    pub fn margin(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        let value = self.value(x)?;
        Ok(Self::margin_of(value, self.interval()))
    }

    pub fn is_satisfied(&self, x: &[f64]) -> Result<bool, EvaluationError> {
        Ok(self.margin(x)? >= -TOLERANCE)
    }

    fn margin_of(value: f64, interval: (Option<f64>, Option<f64>)) -> f64 {
        let lower = interval.0.map(|l| value - l).unwrap_or(f64::INFINITY);
        let upper = interval.1.map(|u| u - value).unwrap_or(f64::INFINITY);
        lower.min(upper)
    }

    /// Largest bound magnitude, used to scale the feasibility tolerance
    pub(crate) fn scale(&self) -> f64 {
        let (lower, upper) = self.interval();
        let lower = lower.map(f64::abs).unwrap_or(0.0);
        let upper = upper.map(f64::abs).unwrap_or(0.0);
        lower.max(upper).max(1.0)
    }

    fn validate(&self, num_variables: usize) -> Result<(), ConfigurationError> {
        match self {
            Constraint::Linear {
                name,
                coefficients,
                bound,
                ..
            } => {
                if coefficients.len() != num_variables {
                    return Err(ConfigurationError::DimensionMismatch {
                        what: format!("Constraint '{}'", name),
                        expected: num_variables,
                        found: coefficients.len(),
                    });
                }
                if !bound.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ConfigurationError::NonFiniteConstraint(name.clone()));
                }
            }
            Constraint::Nonlinear {
                name, lower, upper, ..
            } => match (lower, upper) {
                (None, None) => return Err(ConfigurationError::UnboundedConstraint(name.clone())),
                (Some(l), Some(u)) if l > u => {
                    return Err(ConfigurationError::InvalidConstraintBounds {
                        name: name.clone(),
                        lower: *l,
                        upper: *u,
                    })
                }
                (l, u) => {
                    if l.iter().chain(u.iter()).any(|b| !b.is_finite()) {
                        return Err(ConfigurationError::NonFiniteConstraint(name.clone()));
                    }
                }
            },
        }
        Ok(())
    }
}

/// Evaluation of one constraint at a decision vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintStatus {
    pub name: String,
    pub satisfied: bool,
    pub margin: f64,
}

/// Complete optimization problem: minimize the objective subject to the
/// constraints and the per-variable bounds.
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    variables: Vec<Variable>,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new(
        variables: Vec<Variable>,
        objective: Objective,
        constraints: Vec<Constraint>,
    ) -> Result<Self, ConfigurationError> {
        let problem = Self {
            name: String::new(),
            variables,
            objective,
            constraints,
        };
        problem.validate()?;
        Ok(problem)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Copy of this problem with a different constraint set
    pub fn with_constraints(&self, constraints: Vec<Constraint>) -> Result<Self, ConfigurationError> {
        Problem::new(self.variables.clone(), self.objective.clone(), constraints)
            .map(|p| p.with_name(self.name.clone()))
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Linear objective and linear constraints only
    pub fn is_linear(&self) -> bool {
        self.objective.is_linear() && self.constraints.iter().all(Constraint::is_linear)
    }

    pub fn evaluate_objective(&self, x: &[f64]) -> Result<f64, EvaluationError> {
        self.check_dimension(x)?;
        self.objective.evaluate(x)
    }

    pub fn evaluate_constraints(&self, x: &[f64]) -> Result<Vec<ConstraintStatus>, EvaluationError> {
        self.check_dimension(x)?;
        self.constraints
            .iter()
            .map(|c| {
                let margin = c.margin(x)?;
                Ok(ConstraintStatus {
                    name: c.name().to_string(),
                    satisfied: margin >= -TOLERANCE,
                    margin,
                })
            })
            .collect()
    }

    /// Whether `x` respects bounds and constraints within the feasibility tolerance
    pub fn is_feasible(&self, x: &[f64]) -> Result<bool, EvaluationError> {
        self.check_dimension(x)?;
        let within_bounds = self.variables.iter().zip(x).all(|(var, &v)| {
            let tolerance = FEASIBILITY_TOLERANCE * v.abs().max(1.0);
            v >= var.lower_bound - tolerance
                && var.upper_bound.map_or(true, |upper| v <= upper + tolerance)
        });
        if !within_bounds {
            return Ok(false);
        }
        for constraint in &self.constraints {
            if constraint.margin(x)? < -FEASIBILITY_TOLERANCE * constraint.scale() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Project `x` into the variable bounds
    pub fn clamp_to_bounds(&self, x: &[f64]) -> Vec<f64> {
        self.variables
            .iter()
            .zip(x)
            .map(|(var, &v)| var.clamp(v))
            .collect()
    }

    pub fn check_dimension(&self, x: &[f64]) -> Result<(), EvaluationError> {
        if x.len() != self.variables.len() {
            return Err(EvaluationError::DimensionMismatch {
                expected: self.variables.len(),
                found: x.len(),
            });
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let num_vars = self.variables.len();
        if num_vars == 0 {
            return Err(ConfigurationError::NoVariables);
        }

        for (index, var) in self.variables.iter().enumerate() {
            if !var.lower_bound.is_finite() {
                return Err(ConfigurationError::NonFiniteLowerBound {
                    index,
                    name: var.name.clone(),
                });
            }
            if let Some(upper) = var.upper_bound {
                if !upper.is_finite() {
                    return Err(ConfigurationError::NonFiniteUpperBound {
                        index,
                        name: var.name.clone(),
                    });
                }
                if var.lower_bound > upper {
                    return Err(ConfigurationError::InvalidBounds {
                        index,
                        name: var.name.clone(),
                        lower: var.lower_bound,
                        upper,
                    });
                }
            }
        }

        if let Objective::Linear(coefficients) = &self.objective {
            if coefficients.len() != num_vars {
                return Err(ConfigurationError::DimensionMismatch {
                    what: "Objective".to_string(),
                    expected: num_vars,
                    found: coefficients.len(),
                });
            }
        }

        for constraint in &self.constraints {
            constraint.validate(num_vars)?;
        }
        Ok(())
    }
}

/// Configuration for the solver adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverConfig {
    pub method: Method,
    /// Iteration cap per solve
    pub max_iterations: usize,
    /// Initial trust-region radius of the sequential methods
    pub initial_trust_radius: f64,
    /// Largest trust-region radius the sequential methods may grow to
    pub max_trust_radius: f64,
    /// Starting weight of constraint violation in the sequential methods' merit
    /// function; raised automatically when a solve stalls at an infeasible point
    pub penalty: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: Method::Auto,
            max_iterations: 1000,
            initial_trust_radius: 1.0,
            max_trust_radius: 1e6,
            penalty: 10.0,
        }
    }
}

impl SolverConfig {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_trust_radius(mut self, initial: f64, max: f64) -> Self {
        self.initial_trust_radius = initial;
        self.max_trust_radius = max;
        self
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_iterations == 0 {
            return Err(ConfigurationError::InvalidSolverConfig(
                "max_iterations must be positive".to_string(),
            ));
        }
        let radius_ok = |r: f64| r.is_finite() && r > 0.0;
        if !radius_ok(self.initial_trust_radius)
            || !radius_ok(self.max_trust_radius)
            || self.initial_trust_radius > self.max_trust_radius
        {
            return Err(ConfigurationError::InvalidSolverConfig(format!(
                "trust radius must satisfy 0 < initial ({}) <= max ({})",
                self.initial_trust_radius, self.max_trust_radius
            )));
        }
        if !(self.penalty.is_finite() && self.penalty > 0.0) {
            return Err(ConfigurationError::InvalidSolverConfig(format!(
                "penalty must be positive, got {}",
                self.penalty
            )));
        }
        Ok(())
    }
}

/// Result of one solver invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub status: SolutionStatus,
    /// Final iterate; empty when the backend produced none
    pub optimal_vector: Vec<f64>,
    pub optimal_value: Option<f64>,
    pub iterations: u64,
    pub message: String,
    pub elapsed: Duration,
}

impl SolveOutcome {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_vector: Vec::new(),
            optimal_value: None,
            iterations: 0,
            message: message.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn optimal(value: f64, optimal_vector: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_vector,
            optimal_value: Some(value),
            iterations: 0,
            message: "Optimal solution found".to_string(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_point(mut self, value: f64, vector: Vec<f64>) -> Self {
        self.optimal_value = Some(value);
        self.optimal_vector = vector;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn success(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Same status, iteration count and optimum up to `tolerance`; wall time is ignored
    pub fn agrees_with(&self, other: &SolveOutcome, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0);
        let values_agree = match (self.optimal_value, other.optimal_value) {
            (Some(a), Some(b)) => close(a, b),
            (None, None) => true,
            _ => false,
        };
        self.status == other.status
            && self.iterations == other.iterations
            && values_agree
            && self.optimal_vector.len() == other.optimal_vector.len()
            && self
                .optimal_vector
                .iter()
                .zip(&other.optimal_vector)
                .all(|(&a, &b)| close(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_variable_problem(constraints: Vec<Constraint>) -> Result<Problem, ConfigurationError> {
        Problem::new(
            vec![Variable::serving("x"), Variable::serving("y")],
            Objective::linear(vec![1.0, 2.0]),
            constraints,
        )
    }

    #[test]
    fn margins_follow_direction() {
        let le = Constraint::less_than("le", vec![1.0, 1.0], 10.0);
        let ge = Constraint::greater_than("ge", vec![1.0, 1.0], 10.0);
        assert_relative_eq!(le.margin(&[3.0, 4.0]).unwrap(), 3.0);
        assert_relative_eq!(ge.margin(&[3.0, 4.0]).unwrap(), -3.0);
        assert!(le.is_satisfied(&[3.0, 4.0]).unwrap());
        assert!(!ge.is_satisfied(&[3.0, 4.0]).unwrap());
    }

    #[test]
    fn two_sided_nonlinear_margin_is_tightest_side() {
        let sum = Constraint::nonlinear(
            "sum",
            NonlinearFunction::Custom(Evaluator::new(|x| Ok(x.iter().sum()))),
            Some(2.0),
            Some(10.0),
        );
        assert_relative_eq!(sum.margin(&[1.0, 2.0]).unwrap(), 1.0);
        assert_relative_eq!(sum.margin(&[4.0, 5.0]).unwrap(), 1.0);
        assert_relative_eq!(sum.margin(&[6.0, 6.0]).unwrap(), -2.0);
    }

    #[test]
    fn evaluate_constraints_reports_each_constraint() {
        let problem = two_variable_problem(vec![
            Constraint::less_than("cap", vec![1.0, 1.0], 4.0),
            Constraint::greater_than("floor", vec![1.0, 0.0], 1.0),
        ])
        .unwrap();
        let statuses = problem.evaluate_constraints(&[0.5, 1.0]).unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "cap");
        assert!(statuses[0].satisfied);
        assert!(!statuses[1].satisfied);
        assert_relative_eq!(statuses[1].margin, -0.5);
        assert_relative_eq!(problem.evaluate_objective(&[0.5, 1.0]).unwrap(), 2.5);
    }

    #[test]
    fn rejects_malformed_bounds() {
        let result = Problem::new(
            vec![Variable::serving("x").with_bounds(5.0, Some(1.0))],
            Objective::linear(vec![1.0]),
            vec![],
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidBounds { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_upper_bounds() {
        for upper in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = Problem::new(
                vec![
                    Variable::serving("x"),
                    Variable::serving("y").with_bounds(0.0, Some(upper)),
                ],
                Objective::linear(vec![1.0, 1.0]),
                vec![],
            );
            assert!(
                matches!(
                    result,
                    Err(ConfigurationError::NonFiniteUpperBound { index: 1, .. })
                ),
                "{}",
                upper
            );
        }
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let result = two_variable_problem(vec![Constraint::less_than("short", vec![1.0], 4.0)]);
        assert!(matches!(
            result,
            Err(ConfigurationError::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));

        let result = Problem::new(
            vec![Variable::serving("x")],
            Objective::linear(vec![1.0, 1.0]),
            vec![],
        );
        assert!(matches!(result, Err(ConfigurationError::DimensionMismatch { .. })));
    }

    #[test]
    fn rejects_unbounded_nonlinear_constraint() {
        let result = two_variable_problem(vec![Constraint::nonlinear(
            "cv",
            NonlinearFunction::CoefficientOfVariation,
            None,
            None,
        )]);
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::UnboundedConstraint("cv".to_string())
        );
    }

    #[test]
    fn evaluation_checks_vector_length() {
        let problem = two_variable_problem(vec![]).unwrap();
        assert_eq!(
            problem.evaluate_objective(&[1.0]),
            Err(EvaluationError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn linearity_tracks_constraints_and_objective() {
        let linear = two_variable_problem(vec![Constraint::less_than("c", vec![1.0, 1.0], 1.0)])
            .unwrap();
        assert!(linear.is_linear());
        let with_cv = linear
            .with_constraints(vec![Constraint::nonlinear(
                "cv",
                NonlinearFunction::CoefficientOfVariation,
                None,
                Some(1.0),
            )])
            .unwrap();
        assert!(!with_cv.is_linear());
    }

    #[test]
    fn clamp_respects_optional_upper_bound() {
        let problem = Problem::new(
            vec![
                Variable::serving("x"),
                Variable::serving("y").with_bounds(1.0, Some(2.0)),
            ],
            Objective::linear(vec![1.0, 1.0]),
            vec![],
        )
        .unwrap();
        assert_eq!(problem.clamp_to_bounds(&[-3.0, 7.0]), vec![0.0, 2.0]);
        assert_eq!(problem.clamp_to_bounds(&[1e9, 0.0]), vec![1e9, 1.0]);
    }

    #[test]
    fn solver_config_validation() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.penalty, 10.0);
        assert!(SolverConfig::default().with_max_iterations(0).validate().is_err());
        assert!(SolverConfig::default().with_trust_radius(2.0, 1.0).validate().is_err());
        assert!(SolverConfig::default().with_penalty(-1.0).validate().is_err());
    }

    #[test]
    fn outcomes_agree_within_tolerance() {
        let a = SolveOutcome::optimal(1.0, vec![1.0, 2.0]).with_iterations(3);
        let b = SolveOutcome::optimal(1.0 + 1e-12, vec![1.0, 2.0 + 1e-12])
            .with_iterations(3)
            .with_elapsed(Duration::from_millis(5));
        assert!(a.agrees_with(&b, 1e-8));
        assert!(!a.agrees_with(&b.clone().with_iterations(4), 1e-8));
    }
}
