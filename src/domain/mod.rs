// Domain module: problem model, outcomes and the solver contract

pub mod dispersion;
pub mod errors;
pub mod models;
pub mod solver_service;
pub mod value_objects;

pub use dispersion::*;
pub use errors::*;
pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
