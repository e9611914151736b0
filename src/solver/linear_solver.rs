// LP specialization of the solver service
// Packs the problem into inequality form and hands it to one LP backend

use crate::domain::{
    models::{Problem, SolveOutcome, SolverConfig},
    solver_service::{Result, SolverService},
    value_objects::SolutionStatus,
};
use crate::solver::linear::{LinearBackend, LinearProgram};
use std::time::Instant;

/// Solves linear problems with a single LP backend.
///
/// LP methods do not take an initial guess; the starting vector is only
/// validated.
pub struct LinearProgrammingSolver {
    backend: Box<dyn LinearBackend>,
    config: SolverConfig,
}

impl LinearProgrammingSolver {
    pub fn new(backend: Box<dyn LinearBackend>, config: SolverConfig) -> Self {
        Self { backend, config }
    }
}

impl SolverService for LinearProgrammingSolver {
    fn solve(&self, problem: &Problem, start: &[f64]) -> Result<SolveOutcome> {
        self.validate(problem, start)?;
        self.config.validate()?;

        let start_time = Instant::now();
        let lp = LinearProgram::from_problem(problem)?;
        let solution = self.backend.solve_lp(&lp, self.config.max_iterations)?;
        let elapsed = start_time.elapsed();

        if !solution.x.is_empty() && solution.status == SolutionStatus::Optimal {
            let value = problem.evaluate_objective(&solution.x)?;
            let mut outcome = SolveOutcome::optimal(value, solution.x)
                .with_iterations(solution.iterations)
                .with_elapsed(elapsed);
            if !problem.name.is_empty() {
                outcome.message = format!("Optimal solution found for '{}'", problem.name);
            }
            return Ok(outcome);
        }

        Ok(SolveOutcome::new(solution.status, solution.message)
            .with_iterations(solution.iterations)
            .with_elapsed(elapsed))
    }

    fn name(&self) -> &str {
        self.backend.name()
    }

    fn supports_nonlinear(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        models::{Constraint, NonlinearFunction, Objective, Variable},
        solver_service::SolverError,
    };
    use crate::solver::good_lp_backend::GoodLpBackend;
    use approx::assert_relative_eq;

    fn simplex() -> LinearProgrammingSolver {
        LinearProgrammingSolver::new(Box::new(GoodLpBackend::simplex()), SolverConfig::default())
    }

    fn textbook_problem() -> Problem {
        Problem::new(
            vec![Variable::serving("x1"), Variable::serving("x2")],
            Objective::linear(vec![-2.0, -1.0]),
            vec![
                Constraint::less_than("c1", vec![4.0, 3.0], 12.0),
                Constraint::less_than("c2", vec![2.0, 1.0], 4.0),
                Constraint::less_than("c3", vec![1.0, 2.0], 4.0),
            ],
        )
        .unwrap()
        .with_name("textbook")
    }

    #[test]
    fn solves_textbook_problem() {
        let outcome = simplex().solve(&textbook_problem(), &[0.0, 0.0]).unwrap();
        assert!(outcome.success());
        assert_relative_eq!(outcome.optimal_value.unwrap(), -4.0, epsilon = 1e-7);
        assert_eq!(outcome.message, "Optimal solution found for 'textbook'");
    }

    #[test]
    fn infeasible_problem_is_an_outcome_not_an_error() {
        let problem = Problem::new(
            vec![Variable::serving("x")],
            Objective::linear(vec![1.0]),
            vec![
                Constraint::less_than("cap", vec![1.0], 1.0),
                Constraint::greater_than("floor", vec![1.0], 2.0),
            ],
        )
        .unwrap();
        let outcome = simplex().solve(&problem, &[0.0]).unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.status, SolutionStatus::Infeasible);
        assert!(outcome.message.contains("infeasible"));
    }

    #[test]
    fn rejects_nonlinear_problems() {
        let problem = textbook_problem()
            .with_constraints(vec![Constraint::nonlinear(
                "cv",
                NonlinearFunction::CoefficientOfVariation,
                None,
                Some(1.0),
            )])
            .unwrap();
        assert!(matches!(
            simplex().solve(&problem, &[1.0, 1.0]),
            Err(SolverError::UnsupportedProblem(_))
        ));
    }

    #[test]
    fn rejects_mismatched_starting_vector() {
        assert!(matches!(
            simplex().solve(&textbook_problem(), &[0.0]),
            Err(SolverError::InvalidProblem(_))
        ));
    }
}
