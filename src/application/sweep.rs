// Parameter sweep driver
// Re-solves the problem once per scanned parameter value and collects the results

use crate::application::constraint_builder::ConstraintBuilder;
use crate::application::monitor::SweepMonitor;
use crate::dataset::{DietTargets, FoodCatalog, ServingBounds};
use crate::domain::{
    errors::ConfigurationError,
    models::{Constraint, Problem},
    solver_service::SolverService,
};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Largest number of steps a single range may hold
pub const MAX_SWEEP_STEPS: usize = 1_000_000;

/// Inclusive scan `lower, lower + step, ..., upper`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRange {
    lower: f64,
    upper: f64,
    step: f64,
}

impl SweepRange {
    pub fn new(lower: f64, upper: f64, step: f64) -> Result<Self, ConfigurationError> {
        if !(lower.is_finite() && upper.is_finite() && step.is_finite()) {
            return Err(ConfigurationError::InvalidSweepRange(format!(
                "bounds and step must be finite, got ({}, {}, {})",
                lower, upper, step
            )));
        }
        if step <= 0.0 {
            return Err(ConfigurationError::InvalidSweepRange(format!(
                "step must be positive, got {}",
                step
            )));
        }
        if lower > upper {
            return Err(ConfigurationError::InvalidSweepRange(format!(
                "lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }
        let intervals = ((upper - lower) / step).round();
        if intervals >= MAX_SWEEP_STEPS as f64 {
            return Err(ConfigurationError::InvalidSweepRange(format!(
                "({} - {}) / {} gives more than {} steps",
                upper, lower, step, MAX_SWEEP_STEPS
            )));
        }
        Ok(Self { lower, upper, step })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// `round((upper - lower) / step) + 1`
    pub fn step_count(&self) -> usize {
        ((self.upper - self.lower) / self.step).round() as usize + 1
    }

    /// Parameter value of step `index`, computed directly to avoid drift
    pub fn value(&self, index: usize) -> f64 {
        self.lower + index as f64 * self.step
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.step_count()).map(move |i| self.value(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepConfig {
    /// Decimal places kept in each row's rounded vector
    pub decimals: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { decimals: 3 }
    }
}

impl SweepConfig {
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    fn round(&self, vector: &[f64]) -> Vec<f64> {
        let factor = 10f64.powi(self.decimals as i32);
        // adding 0.0 turns -0.0 into 0.0
        vector.iter().map(|v| (v * factor).round() / factor + 0.0).collect()
    }
}

/// What happened at one sweep step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SweepStep {
    Solved {
        optimal_value: f64,
        iterations: u64,
        elapsed: Duration,
        rounded_vector: Vec<f64>,
    },
    Skipped {
        reason: String,
        elapsed: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub parameter_value: f64,
    pub step: SweepStep,
}

impl SweepRow {
    pub fn is_solved(&self) -> bool {
        matches!(self.step, SweepStep::Solved { .. })
    }

    pub fn optimal_value(&self) -> Option<f64> {
        match &self.step {
            SweepStep::Solved { optimal_value, .. } => Some(*optimal_value),
            SweepStep::Skipped { .. } => None,
        }
    }

    pub fn iterations(&self) -> Option<u64> {
        match &self.step {
            SweepStep::Solved { iterations, .. } => Some(*iterations),
            SweepStep::Skipped { .. } => None,
        }
    }

    pub fn rounded_vector(&self) -> Option<&[f64]> {
        match &self.step {
            SweepStep::Solved { rounded_vector, .. } => Some(rounded_vector),
            SweepStep::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match &self.step {
            SweepStep::Skipped { reason, .. } => Some(reason),
            SweepStep::Solved { .. } => None,
        }
    }

    /// Wall time of the solve call
    pub fn elapsed(&self) -> Duration {
        match &self.step {
            SweepStep::Solved { elapsed, .. } | SweepStep::Skipped { elapsed, .. } => *elapsed,
        }
    }
}

/// Rows of a finished sweep in ascending parameter order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SweepReport {
    rows: Vec<SweepRow>,
}

impl SweepReport {
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn solved(&self) -> impl Iterator<Item = &SweepRow> {
        self.rows.iter().filter(|r| r.is_solved())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SweepRow> {
        self.rows.iter().filter(|r| !r.is_solved())
    }

    /// Solved row with the lowest optimal value; ties keep the earliest row
    pub fn best(&self) -> Option<&SweepRow> {
        self.solved().fold(None, |best: Option<&SweepRow>, row| match best {
            Some(b) if b.optimal_value() <= row.optimal_value() => Some(b),
            _ => Some(row),
        })
    }
}

/// Drives one solver across a parameter range
///
/// Every step starts from the same starting vector; the previous step's
/// optimum is never reused.
pub struct SweepDriver<'a> {
    problem: &'a Problem,
    solver: &'a dyn SolverService,
    start: &'a [f64],
    config: SweepConfig,
}

impl<'a> SweepDriver<'a> {
    pub fn new(problem: &'a Problem, solver: &'a dyn SolverService, start: &'a [f64]) -> Self {
        Self {
            problem,
            solver,
            start,
            config: SweepConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the sweep
    ///
    /// `constraints_at` returns the full active constraint set for a parameter
    /// value. Its errors, and an ill-sized starting vector, abort the sweep;
    /// failed solves are recorded as skipped rows.
    pub fn run<F>(
        &self,
        range: &SweepRange,
        mut constraints_at: F,
        monitor: &mut dyn SweepMonitor,
    ) -> Result<SweepReport, ConfigurationError>
    where
        F: FnMut(f64) -> Result<Vec<Constraint>, ConfigurationError>,
    {
        if self.start.len() != self.problem.num_variables() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "Starting vector".to_string(),
                expected: self.problem.num_variables(),
                found: self.start.len(),
            });
        }

        monitor.on_sweep_start(range, self.solver.name());
        let mut rows = Vec::with_capacity(range.step_count());
        for parameter_value in range.values() {
            let problem = self.problem.with_constraints(constraints_at(parameter_value)?)?;

            let start_time = Instant::now();
            let result = self.solver.solve(&problem, self.start);
            let elapsed = start_time.elapsed();

            let step = match result {
                Ok(outcome) => match (outcome.success(), outcome.optimal_value) {
                    (true, Some(optimal_value)) => SweepStep::Solved {
                        optimal_value,
                        iterations: outcome.iterations,
                        elapsed,
                        rounded_vector: self.config.round(&outcome.optimal_vector),
                    },
                    _ => SweepStep::Skipped {
                        reason: format!("{}: {}", outcome.status, outcome.message),
                        elapsed,
                    },
                },
                Err(e) => SweepStep::Skipped {
                    reason: e.to_string(),
                    elapsed,
                },
            };

            let row = SweepRow {
                parameter_value,
                step,
            };
            if row.is_solved() {
                monitor.on_step_solved(&row);
            } else {
                monitor.on_step_skipped(&row);
            }
            rows.push(row);
        }

        let report = SweepReport { rows };
        monitor.on_sweep_end(&report);
        Ok(report)
    }
}

/// Sweep the coefficient-of-variation ceiling over `range` on the diet problem
/// with the budget and nutrient constraints active
pub fn cv_sweep(
    catalog: &FoodCatalog,
    targets: &DietTargets,
    bounds: ServingBounds,
    range: &SweepRange,
    solver: &dyn SolverService,
    start: &[f64],
    monitor: &mut dyn SweepMonitor,
) -> Result<SweepReport, ConfigurationError> {
    let builder = ConstraintBuilder::new(catalog, targets);
    let problem = builder.problem(bounds)?;
    SweepDriver::new(&problem, solver, start).run(
        range,
        |ceiling| builder.clone().with_max_cv(Some(ceiling)).build(),
        monitor,
    )
}
