// Domain value objects representing core optimization concepts

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Absolute tolerance for every float-to-zero comparison and convergence check.
pub const TOLERANCE: f64 = 1e-8;

/// Relative tolerance used when accepting a final point as feasible.
///
/// A margin `m` on a constraint with bound `b` is accepted when
/// `m >= -FEASIBILITY_TOLERANCE * max(1, |b|)`.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Direction of a linear constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LessThanOrEqual => write!(f, "<="),
            Direction::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

/// Status of a solve attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolutionStatus {
    /// Found an optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Iteration limit reached before convergence
    IterationLimit,
    /// Backend reported a numerical or internal failure
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::IterationLimit => write!(f, "Iteration Limit Reached"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Solution method requested from the solver adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Method {
    /// Simplex for linear problems, SLP otherwise
    #[default]
    Auto,
    /// Trust-region sequential linear programming, simplex subproblems
    ///
    /// First order: there is no curvature model, so it is not an SQP method.
    Slp,
    /// Trust-region sequential linear programming, interior-point subproblems
    TrustConstr,
    /// Linear programming with the microlp simplex
    Simplex,
    /// Linear programming with the clarabel interior-point method
    InteriorPoint,
    /// Linear programming with HiGHS (requires the `highs` feature)
    Highs,
}

impl Method {
    /// Whether the method only accepts linear problems
    pub fn is_linear_only(&self) -> bool {
        matches!(
            self,
            Method::Simplex | Method::InteriorPoint | Method::Highs
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Auto => write!(f, "auto"),
            Method::Slp => write!(f, "slp"),
            Method::TrustConstr => write!(f, "trust-constr"),
            Method::Simplex => write!(f, "simplex"),
            Method::InteriorPoint => write!(f, "interior-point"),
            Method::Highs => write!(f, "highs"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Method::Auto),
            "slp" => Ok(Method::Slp),
            "trust-constr" | "trust_constr" => Ok(Method::TrustConstr),
            "simplex" => Ok(Method::Simplex),
            "interior-point" | "interior_point" => Ok(Method::InteriorPoint),
            "highs" => Ok(Method::Highs),
            other => Err(format!("unknown solution method '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip_through_display() {
        for method in [
            Method::Auto,
            Method::Slp,
            Method::TrustConstr,
            Method::Simplex,
            Method::InteriorPoint,
            Method::Highs,
        ] {
            assert_eq!(method.to_string().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn method_aliases_parse() {
        assert_eq!("SLP".parse::<Method>(), Ok(Method::Slp));
        assert_eq!(" trust_constr ".parse::<Method>(), Ok(Method::TrustConstr));
        assert!("newton".parse::<Method>().is_err());
    }

    #[test]
    fn sqp_names_are_rejected() {
        for name in ["sqp", "slsqp", "SLSQP"] {
            assert!(name.parse::<Method>().is_err(), "{}", name);
        }
    }

    #[test]
    fn linear_only_methods() {
        assert!(Method::Simplex.is_linear_only());
        assert!(Method::Highs.is_linear_only());
        assert!(!Method::Slp.is_linear_only());
        assert!(!Method::Auto.is_linear_only());
    }
}
