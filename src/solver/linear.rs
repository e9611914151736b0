// Packed linear-program form shared by every LP backend
// Translates the domain problem into `minimize c·x s.t. A x <= b, bounds`

use crate::domain::{
    models::{Constraint, Problem},
    solver_service::{Result, SolverError},
    value_objects::{Direction, SolutionStatus},
};

/// Linear program in inequality form: minimize `objective · x` subject to
/// `a_ub · x <= b_ub` and per-variable `(lower, upper)` bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    pub a_ub: Vec<Vec<f64>>,
    pub b_ub: Vec<f64>,
    /// `None` upper bound means unbounded above
    pub bounds: Vec<(f64, Option<f64>)>,
}

impl LinearProgram {
    /// Pack a linear problem; `>=` rows are negated into `<=` rows
    pub fn from_problem(problem: &Problem) -> Result<Self> {
        let objective = problem
            .objective()
            .coefficients()
            .ok_or_else(|| {
                SolverError::UnsupportedProblem("objective is not linear".to_string())
            })?
            .to_vec();

        let mut a_ub = Vec::with_capacity(problem.constraints().len());
        let mut b_ub = Vec::with_capacity(problem.constraints().len());
        for constraint in problem.constraints() {
            match constraint {
                Constraint::Linear {
                    coefficients,
                    bound,
                    direction,
                    ..
                } => match direction {
                    Direction::LessThanOrEqual => {
                        a_ub.push(coefficients.clone());
                        b_ub.push(*bound);
                    }
                    Direction::GreaterThanOrEqual => {
                        a_ub.push(coefficients.iter().map(|c| -c).collect());
                        b_ub.push(-bound);
                    }
                },
                Constraint::Nonlinear { name, .. } => {
                    return Err(SolverError::UnsupportedProblem(format!(
                        "constraint '{}' is nonlinear",
                        name
                    )))
                }
            }
        }

        let bounds = problem
            .variables()
            .iter()
            .map(|v| (v.lower_bound, v.upper_bound))
            .collect();

        Ok(Self {
            objective,
            a_ub,
            b_ub,
            bounds,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_rows(&self) -> usize {
        self.b_ub.len()
    }
}

/// Raw result of an LP backend
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: SolutionStatus,
    /// Empty unless the status is optimal
    pub x: Vec<f64>,
    pub iterations: u64,
    pub message: String,
}

impl LpSolution {
    pub fn optimal(x: Vec<f64>, iterations: u64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            x,
            iterations,
            message: "Optimal solution found".to_string(),
        }
    }

    pub fn failed(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            x: Vec::new(),
            iterations: 0,
            message: message.into(),
        }
    }
}

/// A linear-programming engine
///
/// Infeasible or unbounded programs are reported through [`LpSolution::status`];
/// errors are reserved for failures of the engine itself.
pub trait LinearBackend: Send + Sync {
    fn solve_lp(&self, lp: &LinearProgram, max_iterations: usize) -> Result<LpSolution>;

    fn name(&self) -> &str;
}
