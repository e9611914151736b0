use crate::domain::{
    models::{Problem, SolveOutcome, SolverConfig},
    solver_service::{Result, SolverError, SolverService},
    value_objects::Method,
};
use crate::solver::{GoodLpBackend, LinearProgrammingSolver, SequentialLinearSolver};
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for the problem, resolving `Auto` against its linearity
    pub fn create_solver(problem: &Problem, config: &SolverConfig) -> Result<Arc<dyn SolverService>> {
        let method = Self::resolve_method(config.method, problem);
        Self::create_from_method(method, config)
    }

    /// Create a solver for a specific method
    ///
    /// `Auto` yields a solver that picks simplex or SLP per problem.
    pub fn create_from_method(method: Method, config: &SolverConfig) -> Result<Arc<dyn SolverService>> {
        let config = config.clone().with_method(method);
        config.validate()?;
        let solver: Arc<dyn SolverService> = match method {
            Method::Auto => Arc::new(AutoSolver::new(&config)),
            Method::Slp => Arc::new(SequentialLinearSolver::new(
                Box::new(GoodLpBackend::simplex()),
                config,
            )),
            Method::TrustConstr => Arc::new(SequentialLinearSolver::new(
                Box::new(GoodLpBackend::interior_point()),
                config,
            )),
            Method::Simplex => Arc::new(LinearProgrammingSolver::new(
                Box::new(GoodLpBackend::simplex()),
                config,
            )),
            Method::InteriorPoint => Arc::new(LinearProgrammingSolver::new(
                Box::new(GoodLpBackend::interior_point()),
                config,
            )),
            Method::Highs => Self::highs(config)?,
        };
        Ok(solver)
    }

    /// Get the default solver (automatic method selection)
    pub fn default_solver() -> Arc<dyn SolverService> {
        Arc::new(AutoSolver::new(&SolverConfig::default()))
    }

    /// The concrete method `Auto` stands for on this problem
    pub fn resolve_method(method: Method, problem: &Problem) -> Method {
        match method {
            Method::Auto if problem.is_linear() => Method::Simplex,
            Method::Auto => Method::Slp,
            other => other,
        }
    }

    #[cfg(feature = "highs")]
    fn highs(config: SolverConfig) -> Result<Arc<dyn SolverService>> {
        Ok(Arc::new(LinearProgrammingSolver::new(
            Box::new(crate::solver::HighsBackend::new()),
            config,
        )))
    }

    #[cfg(not(feature = "highs"))]
    fn highs(_config: SolverConfig) -> Result<Arc<dyn SolverService>> {
        Err(SolverError::SolverNotAvailable(
            "HiGHS support was not compiled in; enable the `highs` feature".to_string(),
        ))
    }
}

/// Dispatches linear problems to the simplex and everything else to SLP
struct AutoSolver {
    linear: LinearProgrammingSolver,
    general: SequentialLinearSolver,
}

impl AutoSolver {
    fn new(config: &SolverConfig) -> Self {
        Self {
            linear: LinearProgrammingSolver::new(
                Box::new(GoodLpBackend::simplex()),
                config.clone().with_method(Method::Simplex),
            ),
            general: SequentialLinearSolver::new(
                Box::new(GoodLpBackend::simplex()),
                config.clone().with_method(Method::Slp),
            ),
        }
    }
}

impl SolverService for AutoSolver {
    fn solve(&self, problem: &Problem, start: &[f64]) -> Result<SolveOutcome> {
        if problem.is_linear() {
            self.linear.solve(problem, start)
        } else {
            self.general.solve(problem, start)
        }
    }

    fn name(&self) -> &str {
        "auto"
    }

    fn supports_nonlinear(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Constraint, NonlinearFunction, Objective, Variable};

    fn linear_problem() -> Problem {
        Problem::new(
            vec![Variable::serving("x"), Variable::serving("y")],
            Objective::linear(vec![1.0, 1.0]),
            vec![Constraint::greater_than("total", vec![1.0, 1.0], 2.0)],
        )
        .unwrap()
    }

    #[test]
    fn auto_resolves_by_linearity() {
        let linear = linear_problem();
        let nonlinear = linear
            .with_constraints(vec![Constraint::nonlinear(
                "cv",
                NonlinearFunction::CoefficientOfVariation,
                None,
                Some(1.0),
            )])
            .unwrap();
        assert_eq!(SolverFactory::resolve_method(Method::Auto, &linear), Method::Simplex);
        assert_eq!(SolverFactory::resolve_method(Method::Auto, &nonlinear), Method::Slp);
        assert_eq!(
            SolverFactory::resolve_method(Method::InteriorPoint, &nonlinear),
            Method::InteriorPoint
        );
    }

    #[test]
    fn creates_each_pure_rust_method() {
        let config = SolverConfig::default();
        for method in [Method::Slp, Method::TrustConstr, Method::Simplex, Method::InteriorPoint] {
            let solver = SolverFactory::create_from_method(method, &config).unwrap();
            assert_eq!(solver.supports_nonlinear(), !method.is_linear_only());
        }
    }

    #[test]
    fn default_solver_handles_linear_problems() {
        let outcome = SolverFactory::default_solver()
            .solve(&linear_problem(), &[0.0, 0.0])
            .unwrap();
        assert!(outcome.success());
        assert!((outcome.optimal_value.unwrap() - 2.0).abs() < 1e-7);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SolverConfig::default().with_max_iterations(0);
        assert!(matches!(
            SolverFactory::create_from_method(Method::Slp, &config),
            Err(SolverError::InvalidProblem(_))
        ));
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn highs_requires_feature() {
        assert!(matches!(
            SolverFactory::create_from_method(Method::Highs, &SolverConfig::default()),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }
}
