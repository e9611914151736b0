// HiGHS LP backend
// Translates the packed linear program into a HiGHS row problem

use crate::domain::{solver_service::Result, value_objects::SolutionStatus};
use crate::solver::linear::{LinearBackend, LinearProgram, LpSolution};
use highs::{HighsModelStatus, RowProblem, Sense};

#[derive(Debug, Clone, Default)]
pub struct HighsBackend;

impl HighsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LinearBackend for HighsBackend {
    fn solve_lp(&self, lp: &LinearProgram, max_iterations: usize) -> Result<LpSolution> {
        let mut pb = RowProblem::default();

        let columns: Vec<_> = lp
            .bounds
            .iter()
            .zip(&lp.objective)
            .map(|(&(lower, upper), &coeff)| {
                pb.add_column(coeff, lower..upper.unwrap_or(f64::INFINITY))
            })
            .collect();

        for (row, &bound) in lp.a_ub.iter().zip(&lp.b_ub) {
            let terms: Vec<_> = row
                .iter()
                .zip(&columns)
                .filter(|(coeff, _)| **coeff != 0.0)
                .map(|(&coeff, &column)| (column, coeff))
                .collect();
            pb.add_row(..=bound, &terms);
        }

        let mut model = pb.optimise(Sense::Minimise);
        let limit = i32::try_from(max_iterations).unwrap_or(i32::MAX);
        model.set_option("simplex_iteration_limit", limit);
        let solved = model.solve();

        let solution = match solved.status() {
            HighsModelStatus::Optimal => {
                LpSolution::optimal(solved.get_solution().columns().to_vec(), 0)
            }
            HighsModelStatus::Infeasible => LpSolution::failed(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                LpSolution::failed(
                    SolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
            }
            HighsModelStatus::ReachedIterationLimit => LpSolution::failed(
                SolutionStatus::IterationLimit,
                format!("HiGHS reached the iteration limit ({})", max_iterations),
            ),
            status => LpSolution::failed(
                SolutionStatus::Error,
                format!("HiGHS solver returned status: {:?}", status),
            ),
        };
        Ok(solution)
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
