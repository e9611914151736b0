// Solver adapters module

pub mod factory;
pub mod good_lp_backend;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod linear;
pub mod linear_solver;
pub mod sequential;

pub use factory::SolverFactory;
pub use good_lp_backend::{GoodLpBackend, GoodLpEngine};
#[cfg(feature = "highs")]
pub use highs_solver::HighsBackend;
pub use linear::{LinearBackend, LinearProgram, LpSolution};
pub use linear_solver::LinearProgrammingSolver;
pub use sequential::SequentialLinearSolver;
