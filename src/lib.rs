// Domain layer: problem model, outcomes and the solver contract
pub mod domain;

// Static food reference data and diet targets
pub mod dataset;

// Application layer: constraint construction and sweeps
pub mod application;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConfigurationError, Constraint, ConstraintStatus, EvaluationError, Method, NonlinearFunction,
    Objective, Problem, SolutionStatus, SolveOutcome, SolverConfig, SolverError, SolverService,
    Variable,
};

pub use dataset::{DietTargets, FoodCatalog, FoodGroup, FoodItem, Nutrient, ServingBounds, TimeHorizon};

pub use application::{
    cv_sweep, ConstraintBuilder, LogMonitor, NoOperationMonitor, SweepConfig, SweepDriver,
    SweepMonitor, SweepRange, SweepReport, SweepRow, SweepStep,
};

pub use solver::{GoodLpBackend, LinearProgrammingSolver, SequentialLinearSolver, SolverFactory};
