// good_lp LP backends
// Simplex through microlp and interior point through clarabel, both pure Rust

use crate::domain::{solver_service::Result, value_objects::SolutionStatus};
use crate::solver::linear::{LinearBackend, LinearProgram, LpSolution};
use good_lp::{
    solvers::{clarabel::clarabel, microlp::microlp},
    variable, variables, Expression, ResolutionError, Solution as GoodLpSolutionTrait,
    SolverModel, Variable as GoodLpVariable,
};

/// Engine driven through good_lp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodLpEngine {
    /// Dense simplex
    Microlp,
    /// Interior-point conic solver
    Clarabel,
}

#[derive(Debug, Clone)]
pub struct GoodLpBackend {
    engine: GoodLpEngine,
}

impl GoodLpBackend {
    pub fn new(engine: GoodLpEngine) -> Self {
        Self { engine }
    }

    pub fn simplex() -> Self {
        Self::new(GoodLpEngine::Microlp)
    }

    pub fn interior_point() -> Self {
        Self::new(GoodLpEngine::Clarabel)
    }

    pub fn engine(&self) -> GoodLpEngine {
        self.engine
    }
}

impl Default for GoodLpBackend {
    fn default() -> Self {
        Self::simplex()
    }
}

impl LinearBackend for GoodLpBackend {
    // Neither engine exposes an iteration cap or pivot count through good_lp,
    // so `max_iterations` is not forwarded and 0 iterations are reported.
    fn solve_lp(&self, lp: &LinearProgram, _max_iterations: usize) -> Result<LpSolution> {
        let mut vars = variables!();
        let columns: Vec<GoodLpVariable> = lp
            .bounds
            .iter()
            .map(|&(lower, upper)| {
                let definition = variable().min(lower);
                match upper {
                    Some(upper) => vars.add(definition.max(upper)),
                    None => vars.add(definition),
                }
            })
            .collect();

        let mut objective: Expression = 0.into();
        for (&coeff, &column) in lp.objective.iter().zip(&columns) {
            if coeff != 0.0 {
                objective += coeff * column;
            }
        }

        let unsolved = vars.minimise(objective);
        let solution = match self.engine {
            GoodLpEngine::Microlp => solve_model(unsolved.using(microlp), lp, &columns),
            GoodLpEngine::Clarabel => solve_model(unsolved.using(clarabel), lp, &columns),
        };
        Ok(solution)
    }

    fn name(&self) -> &str {
        match self.engine {
            GoodLpEngine::Microlp => "microlp simplex",
            GoodLpEngine::Clarabel => "clarabel interior point",
        }
    }
}

fn solve_model<M>(mut model: M, lp: &LinearProgram, columns: &[GoodLpVariable]) -> LpSolution
where
    M: SolverModel<Error = ResolutionError>,
{
    for (row, &bound) in lp.a_ub.iter().zip(&lp.b_ub) {
        let mut lhs: Expression = 0.into();
        for (&coeff, &column) in row.iter().zip(columns) {
            if coeff != 0.0 {
                lhs += coeff * column;
            }
        }
        model = model.with(lhs.leq(bound));
    }

    match model.solve() {
        Ok(sol) => {
            let x = columns.iter().map(|&column| sol.value(column)).collect();
            LpSolution::optimal(x, 0)
        }
        Err(ResolutionError::Infeasible) => LpSolution::failed(
            SolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        ),
        Err(ResolutionError::Unbounded) => LpSolution::failed(
            SolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        ),
        Err(e) => LpSolution::failed(SolutionStatus::Error, format!("{}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// min -2x - y s.t. 4x + 3y <= 12, 2x + y <= 4, x + 2y <= 4, x, y >= 0
    fn textbook_lp() -> LinearProgram {
        LinearProgram {
            objective: vec![-2.0, -1.0],
            a_ub: vec![vec![4.0, 3.0], vec![2.0, 1.0], vec![1.0, 2.0]],
            b_ub: vec![12.0, 4.0, 4.0],
            bounds: vec![(0.0, None), (0.0, None)],
        }
    }

    fn objective_value(lp: &LinearProgram, x: &[f64]) -> f64 {
        lp.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    #[test]
    fn simplex_solves_textbook_lp() {
        let lp = textbook_lp();
        let solution = GoodLpBackend::simplex().solve_lp(&lp, 100).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_relative_eq!(objective_value(&lp, &solution.x), -4.0, epsilon = 1e-7);
    }

    #[test]
    fn interior_point_solves_textbook_lp() {
        let lp = textbook_lp();
        let solution = GoodLpBackend::interior_point().solve_lp(&lp, 100).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_relative_eq!(objective_value(&lp, &solution.x), -4.0, epsilon = 1e-5);
    }

    #[test]
    fn simplex_reports_infeasibility() {
        let lp = LinearProgram {
            objective: vec![1.0],
            a_ub: vec![vec![1.0], vec![-1.0]],
            b_ub: vec![1.0, -2.0],
            bounds: vec![(0.0, None)],
        };
        let solution = GoodLpBackend::simplex().solve_lp(&lp, 100).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.x.is_empty());
    }

    #[test]
    fn respects_finite_upper_bounds() {
        let lp = LinearProgram {
            objective: vec![-1.0, -1.0],
            a_ub: vec![vec![1.0, 1.0]],
            b_ub: vec![10.0],
            bounds: vec![(0.0, Some(2.0)), (1.0, Some(3.0))],
        };
        let solution = GoodLpBackend::simplex().solve_lp(&lp, 100).unwrap();
        assert_relative_eq!(solution.x[0], 2.0, epsilon = 1e-7);
        assert_relative_eq!(solution.x[1], 3.0, epsilon = 1e-7);
    }
}
