// Application layer: diet constraint construction and parameter sweeps

pub mod constraint_builder;
pub mod monitor;
pub mod sweep;

pub use constraint_builder::ConstraintBuilder;
pub use monitor::{LogMonitor, NoOperationMonitor, SweepMonitor};
pub use sweep::{cv_sweep, SweepConfig, SweepDriver, SweepRange, SweepReport, SweepRow, SweepStep};
