// Domain service interface for solving optimization problems
// Defines the contract that every solver adapter must follow

use super::errors::{ConfigurationError, EvaluationError};
use super::models::{Problem, SolveOutcome};

/// Error types for the solver service
///
/// Infeasibility and non-convergence are not errors: they are reported through
/// [`SolveOutcome::status`] so that callers can decide how to react.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(#[from] ConfigurationError),

    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Unsupported problem: {0}")]
    UnsupportedProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization solvers
///
/// Every backend translates the problem into its own representation and
/// reports back through the same [`SolveOutcome`] shape.
pub trait SolverService: Send + Sync {
    /// Minimize the problem starting from `start`
    fn solve(&self, problem: &Problem, start: &[f64]) -> Result<SolveOutcome>;

    /// Check that this solver can handle the problem and starting vector
    fn validate(&self, problem: &Problem, start: &[f64]) -> Result<()> {
        if start.len() != problem.num_variables() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "Starting vector".to_string(),
                expected: problem.num_variables(),
                found: start.len(),
            }
            .into());
        }
        if start.iter().any(|v| !v.is_finite()) {
            return Err(EvaluationError::NonFiniteValue("starting vector".to_string()).into());
        }
        if !self.supports_nonlinear() && !problem.is_linear() {
            let nonlinear: Vec<&str> = problem
                .constraints()
                .iter()
                .filter(|c| !c.is_linear())
                .map(|c| c.name())
                .collect();
            return Err(SolverError::UnsupportedProblem(format!(
                "{} only accepts linear problems (nonlinear objective or constraints: [{}])",
                self.name(),
                nonlinear.join(", ")
            )));
        }
        Ok(())
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver accepts nonlinear objectives and constraints
    fn supports_nonlinear(&self) -> bool;
}
