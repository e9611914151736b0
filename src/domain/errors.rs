// Construction-time and evaluation-time error taxonomy

/// Malformed problem or dataset configuration, raised before any solve attempt
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Problem must have at least one variable")]
    NoVariables,

    #[error("Variable {index} '{name}' has lower bound ({lower}) > upper bound ({upper})")]
    InvalidBounds {
        index: usize,
        name: String,
        lower: f64,
        upper: f64,
    },

    #[error("Variable {index} '{name}' has a non-finite lower bound")]
    NonFiniteLowerBound { index: usize, name: String },

    #[error("Variable {index} '{name}' has a non-finite upper bound; use None for unbounded")]
    NonFiniteUpperBound { index: usize, name: String },

    #[error("{what} has {found} entries but the problem has {expected} variables")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Constraint '{0}' has neither a lower nor an upper bound")]
    UnboundedConstraint(String),

    #[error("Constraint '{name}' has lower bound ({lower}) > upper bound ({upper})")]
    InvalidConstraintBounds { name: String, lower: f64, upper: f64 },

    #[error("Constraint '{0}' has a non-finite coefficient or bound")]
    NonFiniteConstraint(String),

    #[error("Food catalog is empty")]
    EmptyCatalog,

    #[error("Food item '{name}' has invalid {attribute}: {value}")]
    InvalidFoodAttribute {
        name: String,
        attribute: &'static str,
        value: f64,
    },

    #[error("Food group '{0}' does not occupy a contiguous index range")]
    NonContiguousGroup(String),

    #[error("Invalid diet target: {0}")]
    InvalidTarget(String),

    #[error("Invalid solver configuration: {0}")]
    InvalidSolverConfig(String),

    #[error("Invalid sweep range: {0}")]
    InvalidSweepRange(String),

    #[error("Could not read food catalog: {0}")]
    CatalogFormat(String),
}

/// Failure while evaluating the objective or a constraint at a decision vector
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Coefficient of variation is undefined for a zero-mean vector")]
    UndefinedDispersion,

    #[error("Decision vector has {found} entries but the problem has {expected} variables")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("{0} evaluated to a non-finite value")]
    NonFiniteValue(String),
}
