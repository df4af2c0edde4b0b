// Domain value objects shared by the linear modelling layer and the problem solvers

use std::fmt;
use std::str::FromStr;

/// Type of decision variable in a linear model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Integer number (x ∈ ℤ)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(VariableType::Continuous),
            "integer" => Ok(VariableType::Integer),
            "binary" => Ok(VariableType::Binary),
            other => Err(format!(
                "unknown variable type '{}' (expected continuous, integer or binary)",
                other
            )),
        }
    }
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl FromStr for ConstraintType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" | "le" => Ok(ConstraintType::LessThanOrEqual),
            "=" | "==" | "eq" => Ok(ConstraintType::Equal),
            ">=" | "ge" => Ok(ConstraintType::GreaterThanOrEqual),
            other => Err(format!(
                "unknown constraint type '{}' (expected <=, = or >=)",
                other
            )),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl FromStr for OptimizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimize" | "min" => Ok(OptimizationType::Minimize),
            "maximize" | "max" => Ok(OptimizationType::Maximize),
            other => Err(format!(
                "unknown optimization sense '{}' (expected minimize or maximize)",
                other
            )),
        }
    }
}

/// Status of a linear model solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
        }
    }
}

/// LP/MIP backend used by the linear solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    /// Best backend compiled into this build
    #[default]
    Auto,
    /// Pure Rust simplex with branch and bound
    MicroLp,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
    /// SCIP optimization suite
    Scip,
}

impl SolverBackend {
    pub const ALL: [SolverBackend; 5] = [
        SolverBackend::Auto,
        SolverBackend::MicroLp,
        SolverBackend::CoinCbc,
        SolverBackend::Highs,
        SolverBackend::Scip,
    ];

    /// Whether the backend's cargo feature is part of this build
    pub fn is_available(self) -> bool {
        match self {
            SolverBackend::Auto | SolverBackend::MicroLp => true,
            SolverBackend::CoinCbc => cfg!(feature = "coin_cbc"),
            SolverBackend::Highs => cfg!(feature = "highs"),
            SolverBackend::Scip => cfg!(feature = "scip"),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
            SolverBackend::Scip => write!(f, "SCIP"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SolverBackend::Auto),
            "microlp" => Ok(SolverBackend::MicroLp),
            "coin_cbc" | "cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            "scip" => Ok(SolverBackend::Scip),
            other => Err(format!(
                "unknown solver backend '{}' (expected auto, microlp, coin_cbc, highs or scip)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("HiGHS".parse::<SolverBackend>(), Ok(SolverBackend::Highs));
        assert_eq!("cbc".parse::<SolverBackend>(), Ok(SolverBackend::CoinCbc));
        assert!("gurobi".parse::<SolverBackend>().is_err());
    }

    #[test]
    fn pure_rust_backend_is_always_available() {
        assert!(SolverBackend::MicroLp.is_available());
        assert!(SolverBackend::Auto.is_available());
    }

    #[test]
    fn constraint_operators_parse() {
        assert_eq!(
            "<=".parse::<ConstraintType>(),
            Ok(ConstraintType::LessThanOrEqual)
        );
        assert_eq!("=".parse::<ConstraintType>(), Ok(ConstraintType::Equal));
        assert_eq!(
            ">=".parse::<ConstraintType>(),
            Ok(ConstraintType::GreaterThanOrEqual)
        );
        assert!("<".parse::<ConstraintType>().is_err());
    }
}
