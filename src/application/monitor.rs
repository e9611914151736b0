// Sweep monitors
// Observe the start of a scan, each solved or skipped step, and the final report

use crate::application::sweep::{SweepRange, SweepReport, SweepRow};

/// A monitor for sweep runs.
pub trait SweepMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called once before the first step.
    fn on_sweep_start(&mut self, range: &SweepRange, solver: &str);

    /// Called after a step produced an optimal solution.
    fn on_step_solved(&mut self, row: &SweepRow);

    /// Called after a step was skipped because the solve failed.
    fn on_step_skipped(&mut self, row: &SweepRow);

    /// Called once after the last step.
    fn on_sweep_end(&mut self, report: &SweepReport);
}

impl std::fmt::Debug for dyn SweepMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SweepMonitor {{ name: {} }}", self.name())
    }
}

/// A monitor that does nothing on any event.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NoOperationMonitor;

impl NoOperationMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl SweepMonitor for NoOperationMonitor {
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_sweep_start(&mut self, _range: &SweepRange, _solver: &str) {}

    #[inline(always)]
    fn on_step_solved(&mut self, _row: &SweepRow) {}

    #[inline(always)]
    fn on_step_skipped(&mut self, _row: &SweepRow) {}

    #[inline(always)]
    fn on_sweep_end(&mut self, _report: &SweepReport) {}
}

/// Prints one line per step; skipped steps go to stderr.
#[derive(Debug, Clone, Default)]
pub struct LogMonitor {
    /// Print the rounded serving vector of solved steps
    show_vector: bool,
}

impl LogMonitor {
    pub fn new(show_vector: bool) -> Self {
        Self { show_vector }
    }

    fn print_header(&self) {
        println!(
            "{:<10} | {:<14} | {:<10} | {:<12}",
            "Parameter", "Optimal Value", "Iterations", "Elapsed"
        );
        println!("{}", "-".repeat(56));
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LogMonitor(show_vector: {})", self.show_vector)
    }
}

impl SweepMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_sweep_start(&mut self, range: &SweepRange, solver: &str) {
        println!(
            "Sweeping {} steps from {} to {} with {}",
            range.step_count(),
            range.lower(),
            range.upper(),
            solver
        );
        self.print_header();
    }

    fn on_step_solved(&mut self, row: &SweepRow) {
        if let Some(value) = row.optimal_value() {
            println!(
                "{:<10.4} | {:<14.6} | {:<10} | {:<12}",
                row.parameter_value,
                value,
                row.iterations().unwrap_or(0),
                format!("{:.3}ms", row.elapsed().as_secs_f64() * 1e3)
            );
        }
        if self.show_vector {
            if let Some(vector) = row.rounded_vector() {
                println!("           {:?}", vector);
            }
        }
    }

    fn on_step_skipped(&mut self, row: &SweepRow) {
        eprintln!(
            "Skipping parameter {:.4}: {}",
            row.parameter_value,
            row.skip_reason().unwrap_or("unknown failure")
        );
    }

    fn on_sweep_end(&mut self, report: &SweepReport) {
        println!("{}", "-".repeat(56));
        match report.best() {
            Some(best) => println!(
                "Sweep finished: {} solved, {} skipped, best value {:.6} at {:.4}",
                report.solved().count(),
                report.skipped().count(),
                best.optimal_value().unwrap_or(f64::NAN),
                best.parameter_value
            ),
            None => println!(
                "Sweep finished: no step solved ({} skipped)",
                report.skipped().count()
            ),
        }
    }
}
