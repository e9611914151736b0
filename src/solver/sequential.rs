// Sequential LP Solver
// Trust-region sequential linear programming over an LP backend
//
// Each iteration linearizes the objective and every constraint side and solves
//
//   minimize    ∇f·d + μ Σ s_j
//   subject to  m_j + σ_j ∇c_j·d + s_j >= 0,   s_j >= 0
//               max(lb - x, -Δ) <= d <= min(ub - x, Δ)
//
// where m_j is the margin of side j, σ_j its sign with respect to the
// constraint value and Δ the trust radius. Steps are accepted on the ratio of
// actual to predicted reduction of the L1 merit f + μ Σ max(0, -m_j).
// Converging to an infeasible point raises μ tenfold and restarts the radius;
// only once μ reaches MAX_PENALTY is the point reported as infeasible.

use crate::domain::{
    errors::EvaluationError,
    models::{dot, Constraint, Objective, Problem, SolveOutcome, SolverConfig},
    solver_service::{Result, SolverService},
    value_objects::{SolutionStatus, TOLERANCE},
};
use crate::solver::linear::{LinearBackend, LinearProgram};
use std::time::Instant;

/// Minimum actual/predicted reduction ratio for accepting a step
const ACCEPT_RATIO: f64 = 0.1;
/// Ratio above which a step on the trust-region boundary grows the radius
const EXPAND_RATIO: f64 = 0.75;
/// Forward-difference step, relative to `max(1, |x_i|)`
const DIFFERENCE_STEP: f64 = 1.490_116_119_384_765_6e-8;
/// Factor applied to the penalty after converging to an infeasible point
const PENALTY_GROWTH: f64 = 10.0;
/// No further escalation once the penalty reaches this value
const MAX_PENALTY: f64 = 1e6;

/// General constrained minimizer built on an LP backend
pub struct SequentialLinearSolver {
    backend: Box<dyn LinearBackend>,
    config: SolverConfig,
    name: String,
}

impl SequentialLinearSolver {
    pub fn new(backend: Box<dyn LinearBackend>, config: SolverConfig) -> Self {
        let name = format!("sequential linear programming ({})", backend.name());
        Self {
            backend,
            config,
            name,
        }
    }
}

impl SolverService for SequentialLinearSolver {
    fn solve(&self, problem: &Problem, start: &[f64]) -> Result<SolveOutcome> {
        self.validate(problem, start)?;
        self.config.validate()?;

        let start_time = Instant::now();
        let outcome = TrustRegion::new(problem, &self.config, self.backend.as_ref()).run(start)?;
        Ok(outcome.with_elapsed(start_time.elapsed()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supports_nonlinear(&self) -> bool {
        true
    }
}

/// One bounded side of a constraint
#[derive(Debug, Clone, Copy)]
struct Side {
    constraint: usize,
    bound: f64,
    upper: bool,
}

impl Side {
    fn margin(&self, value: f64) -> f64 {
        if self.upper {
            self.bound - value
        } else {
            value - self.bound
        }
    }

    /// Derivative of the margin with respect to the constraint value
    fn sign(&self) -> f64 {
        if self.upper {
            -1.0
        } else {
            1.0
        }
    }
}

struct Iterate {
    x: Vec<f64>,
    objective: f64,
    /// Constraint values, indexed like the problem's constraints
    values: Vec<f64>,
}

struct TrustRegion<'a> {
    problem: &'a Problem,
    config: &'a SolverConfig,
    backend: &'a dyn LinearBackend,
    sides: Vec<Side>,
}

impl<'a> TrustRegion<'a> {
    fn new(problem: &'a Problem, config: &'a SolverConfig, backend: &'a dyn LinearBackend) -> Self {
        let mut sides = Vec::new();
        for (constraint, c) in problem.constraints().iter().enumerate() {
            let (lower, upper) = c.interval();
            if let Some(bound) = lower {
                sides.push(Side {
                    constraint,
                    bound,
                    upper: false,
                });
            }
            if let Some(bound) = upper {
                sides.push(Side {
                    constraint,
                    bound,
                    upper: true,
                });
            }
        }
        Self {
            problem,
            config,
            backend,
            sides,
        }
    }

    fn run(&self, start: &[f64]) -> Result<SolveOutcome> {
        let mut current = self.evaluate(self.problem.clamp_to_bounds(start))?;
        let mut radius = self.config.initial_trust_radius;
        let mut penalty = self.config.penalty;
        let n = current.x.len();

        for iteration in 1..=self.config.max_iterations as u64 {
            let objective_gradient = self.objective_gradient(&current)?;
            let gradients = self.constraint_gradients(&current)?;
            let margins: Vec<f64> = self
                .sides
                .iter()
                .map(|s| s.margin(current.values[s.constraint]))
                .collect();

            let lp = self.subproblem(
                &current,
                &objective_gradient,
                &gradients,
                &margins,
                radius,
                penalty,
            );
            let solution = self.backend.solve_lp(&lp, self.config.max_iterations)?;
            if solution.status != SolutionStatus::Optimal || solution.x.len() != lp.num_variables() {
                let message = format!("Linear subproblem failed: {}", solution.message);
                return Ok(self.finish(current, SolutionStatus::Error, message, iteration));
            }
            let step = &solution.x[..n];

            let merit = self.merit(&current, penalty);
            let model_violation: f64 = self
                .sides
                .iter()
                .zip(&margins)
                .map(|(s, &m)| (-(m + s.sign() * dot(&gradients[s.constraint], step))).max(0.0))
                .sum();
            let model =
                current.objective + dot(&objective_gradient, step) + penalty * model_violation;
            let predicted = merit - model;
            if predicted <= TOLERANCE * merit.abs().max(1.0) {
                if self.can_escalate(&current, penalty) {
                    penalty *= PENALTY_GROWTH;
                    radius = self.config.initial_trust_radius;
                    continue;
                }
                return Ok(self.converged(current, iteration, "Optimization terminated successfully"));
            }

            let step_norm = step.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
            let trial: Vec<f64> = current.x.iter().zip(step).map(|(x, d)| x + d).collect();
            // A trial point where a constraint is undefined counts as a failed step
            let ratio = match self.evaluate(self.problem.clamp_to_bounds(&trial)) {
                Ok(trial) => {
                    let ratio = (merit - self.merit(&trial, penalty)) / predicted;
                    if ratio >= ACCEPT_RATIO {
                        current = trial;
                    }
                    ratio
                }
                Err(_) => f64::NEG_INFINITY,
            };

            if ratio >= EXPAND_RATIO && step_norm >= 0.9 * radius {
                radius = (2.0 * radius).min(self.config.max_trust_radius);
            } else if ratio < ACCEPT_RATIO {
                radius = 0.5 * radius.min(step_norm);
            }
            if radius < TOLERANCE {
                if !self.can_escalate(&current, penalty) {
                    return Ok(self.converged(current, iteration, "Trust region collapsed below tolerance"));
                }
                penalty *= PENALTY_GROWTH;
                radius = self.config.initial_trust_radius;
            }
        }

        let message = format!("Iteration limit reached ({})", self.config.max_iterations);
        Ok(self.finish(
            current,
            SolutionStatus::IterationLimit,
            message,
            self.config.max_iterations as u64,
        ))
    }

    fn evaluate(&self, x: Vec<f64>) -> std::result::Result<Iterate, EvaluationError> {
        let objective = self.problem.objective().evaluate(&x)?;
        let values = self
            .problem
            .constraints()
            .iter()
            .map(|c| c.value(&x))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Iterate {
            x,
            objective,
            values,
        })
    }

    fn violation(&self, values: &[f64]) -> f64 {
        self.sides
            .iter()
            .map(|s| (-s.margin(values[s.constraint])).max(0.0))
            .sum()
    }

    fn merit(&self, iterate: &Iterate, penalty: f64) -> f64 {
        iterate.objective + penalty * self.violation(&iterate.values)
    }

    /// Stalled at an infeasible point with room to raise the penalty
    fn can_escalate(&self, iterate: &Iterate, penalty: f64) -> bool {
        penalty < MAX_PENALTY && matches!(self.problem.is_feasible(&iterate.x), Ok(false))
    }

    fn objective_gradient(&self, iterate: &Iterate) -> std::result::Result<Vec<f64>, EvaluationError> {
        match self.problem.objective() {
            Objective::Linear(coefficients) => Ok(coefficients.clone()),
            Objective::Custom(_) => {
                let objective = self.problem.objective();
                self.forward_difference(&iterate.x, iterate.objective, |x| objective.evaluate(x))
            }
        }
    }

    fn constraint_gradients(
        &self,
        iterate: &Iterate,
    ) -> std::result::Result<Vec<Vec<f64>>, EvaluationError> {
        self.problem
            .constraints()
            .iter()
            .zip(&iterate.values)
            .map(|(constraint, &value)| match constraint {
                Constraint::Linear { coefficients, .. } => Ok(coefficients.clone()),
                Constraint::Nonlinear { .. } => {
                    self.forward_difference(&iterate.x, value, |x| constraint.value(x))
                }
            })
            .collect()
    }

    fn forward_difference<F>(
        &self,
        x: &[f64],
        fx: f64,
        f: F,
    ) -> std::result::Result<Vec<f64>, EvaluationError>
    where
        F: Fn(&[f64]) -> std::result::Result<f64, EvaluationError>,
    {
        let mut probe = x.to_vec();
        let mut gradient = Vec::with_capacity(x.len());
        for (i, var) in self.problem.variables().iter().enumerate() {
            let h = DIFFERENCE_STEP * x[i].abs().max(1.0);
            // probe backwards at an upper bound
            let h = match var.upper_bound {
                Some(upper) if x[i] + h > upper => -h,
                _ => h,
            };
            probe[i] = x[i] + h;
            let probed = f(&probe)?;
            probe[i] = x[i];
            gradient.push((probed - fx) / h);
        }
        Ok(gradient)
    }

    /// Elastic LP in the variables `[d_0..d_n, s_0..s_m]`
    fn subproblem(
        &self,
        iterate: &Iterate,
        objective_gradient: &[f64],
        gradients: &[Vec<f64>],
        margins: &[f64],
        radius: f64,
        penalty: f64,
    ) -> LinearProgram {
        let n = iterate.x.len();
        let m = self.sides.len();

        let mut objective = objective_gradient.to_vec();
        objective.extend(std::iter::repeat(penalty).take(m));

        let mut bounds: Vec<(f64, Option<f64>)> = self
            .problem
            .variables()
            .iter()
            .zip(&iterate.x)
            .map(|(var, &x)| {
                let lower = (var.lower_bound - x).max(-radius).min(0.0);
                let upper = var
                    .upper_bound
                    .map_or(radius, |u| (u - x).min(radius))
                    .max(0.0);
                (lower, Some(upper))
            })
            .collect();
        bounds.extend(std::iter::repeat((0.0, None)).take(m));

        let mut a_ub = Vec::with_capacity(m);
        for (j, side) in self.sides.iter().enumerate() {
            let mut row = vec![0.0; n + m];
            for (entry, g) in row.iter_mut().zip(&gradients[side.constraint]) {
                *entry = -side.sign() * g;
            }
            row[n + j] = -1.0;
            a_ub.push(row);
        }

        LinearProgram {
            objective,
            a_ub,
            b_ub: margins.to_vec(),
            bounds,
        }
    }

    fn converged(&self, iterate: Iterate, iterations: u64, message: &str) -> SolveOutcome {
        match self.problem.is_feasible(&iterate.x) {
            Ok(true) => self.finish(iterate, SolutionStatus::Optimal, message, iterations),
            Ok(false) => {
                let message = format!(
                    "Converged to an infeasible point (constraint violation {:.3e}); \
                     the constraints appear inconsistent",
                    self.violation(&iterate.values)
                );
                self.finish(iterate, SolutionStatus::Infeasible, message, iterations)
            }
            Err(e) => self.finish(iterate, SolutionStatus::Error, e.to_string(), iterations),
        }
    }

    fn finish(
        &self,
        iterate: Iterate,
        status: SolutionStatus,
        message: impl Into<String>,
        iterations: u64,
    ) -> SolveOutcome {
        SolveOutcome::new(status, message)
            .with_point(iterate.objective, iterate.x)
            .with_iterations(iterations)
    }
}
