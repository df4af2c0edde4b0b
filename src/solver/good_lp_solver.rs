// good_lp adapter
// Translates the domain's OptimizationProblem into a good_lp model and runs it
// on whichever backend this build was compiled with.

use crate::domain::{
    linear_solver::{LinearSolver, Result, SolverError},
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, SolverBackend,
        VariableType,
    },
};
use good_lp::{
    solvers::Solver, variable, variables, Constraint as GoodLpConstraint, Expression,
    ProblemVariables, ResolutionError, Solution as GoodLpSolutionTrait, SolverModel,
    Variable as GoodLpVariable,
};
use std::time::Instant;
use tracing::debug;

/// Linear solver backed by one concrete good_lp backend
#[derive(Debug, Clone, Copy)]
pub struct GoodLpSolver {
    backend: SolverBackend,
}

impl GoodLpSolver {
    /// Resolve `backend` to a concrete one compiled into this build
    pub fn new(backend: SolverBackend) -> Result<Self> {
        let backend = match backend {
            SolverBackend::Auto => Self::best_available(),
            other if other.is_available() => other,
            other => {
                return Err(SolverError::SolverNotAvailable(format!(
                    "{} (rebuild with the matching cargo feature)",
                    other
                )))
            }
        };
        Ok(Self { backend })
    }

    /// The pure Rust backend, available in every build
    pub fn microlp() -> Self {
        Self {
            backend: SolverBackend::MicroLp,
        }
    }

    pub fn backend(&self) -> SolverBackend {
        self.backend
    }

    fn best_available() -> SolverBackend {
        [
            SolverBackend::Highs,
            SolverBackend::CoinCbc,
            SolverBackend::Scip,
        ]
        .into_iter()
        .find(|backend| backend.is_available())
        .unwrap_or(SolverBackend::MicroLp)
    }

    fn run(&self, model: LpModel) -> std::result::Result<Vec<f64>, RunError> {
        match self.backend {
            SolverBackend::MicroLp => model.solve_with(good_lp::solvers::microlp::microlp),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => model.solve_with(good_lp::solvers::coin_cbc::coin_cbc),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => model.solve_with(good_lp::solvers::highs::highs),
            #[cfg(feature = "scip")]
            SolverBackend::Scip => model.solve_with(good_lp::solvers::scip::scip),
            #[allow(unreachable_patterns)]
            other => Err(RunError::Unavailable(other)),
        }
    }
}

enum RunError {
    Resolution(ResolutionError),
    Unavailable(SolverBackend),
}

impl From<ResolutionError> for RunError {
    fn from(err: ResolutionError) -> Self {
        RunError::Resolution(err)
    }
}

/// Backend-neutral good_lp model built from an OptimizationProblem
struct LpModel {
    vars: ProblemVariables,
    handles: Vec<GoodLpVariable>,
    objective: Expression,
    constraints: Vec<GoodLpConstraint>,
}

impl LpModel {
    fn build(problem: &OptimizationProblem) -> Self {
        let mut vars = variables!();
        let mut handles: Vec<GoodLpVariable> = Vec::with_capacity(problem.num_variables());

        for var_def in &problem.variables {
            let lower = var_def.lower_bound;
            let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

            let var = match var_def.variable_type {
                VariableType::Binary => vars.add(
                    variable()
                        .integer()
                        .min(lower.max(0.0))
                        .max(upper.min(1.0)),
                ),
                VariableType::Integer => vars.add(variable().integer().min(lower).max(upper)),
                VariableType::Continuous => vars.add(variable().min(lower).max(upper)),
            };
            handles.push(var);
        }

        // Without explicit variables every column is continuous and non-negative
        if problem.variables.is_empty() {
            for _ in 0..problem.num_variables() {
                handles.push(vars.add(variable().min(0.0)));
            }
        }

        // good_lp minimises, so negate for maximization
        let is_maximize = problem.objective.optimization_type == OptimizationType::Maximize;
        let mut objective: Expression = 0.into();
        for (i, &coeff) in problem.objective.coefficients.iter().enumerate() {
            if coeff != 0.0 {
                let c = if is_maximize { -coeff } else { coeff };
                objective += c * handles[i];
            }
        }

        let constraints = problem
            .constraints
            .iter()
            .map(|constraint| {
                let mut lhs: Expression = 0.into();
                for (i, &coeff) in constraint.coefficients.iter().enumerate() {
                    if coeff != 0.0 {
                        lhs += coeff * handles[i];
                    }
                }

                match constraint.constraint_type {
                    ConstraintType::LessThanOrEqual => lhs.leq(constraint.bound),
                    ConstraintType::Equal => lhs.eq(constraint.bound),
                    ConstraintType::GreaterThanOrEqual => lhs.geq(constraint.bound),
                }
            })
            .collect();

        Self {
            vars,
            handles,
            objective,
            constraints,
        }
    }

    fn solve_with<S>(self, solver: S) -> std::result::Result<Vec<f64>, RunError>
    where
        S: Solver,
        S::Model: SolverModel<Error = ResolutionError>,
    {
        let LpModel {
            vars,
            handles,
            objective,
            constraints,
        } = self;

        let mut model = vars.minimise(objective).using(solver);
        for constraint in constraints {
            model = model.with(constraint);
        }

        let solution = model.solve()?;
        Ok(handles.iter().map(|&var| solution.value(var)).collect())
    }
}

impl LinearSolver for GoodLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let num_vars = problem.num_variables();

        let num_integer = problem
            .variables
            .iter()
            .filter(|v| matches!(v.variable_type, VariableType::Integer))
            .count() as u32;
        let num_binary = problem
            .variables
            .iter()
            .filter(|v| matches!(v.variable_type, VariableType::Binary))
            .count() as u32;

        let solution_result = self.run(LpModel::build(problem));
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;

        let statistics = SolverStatistics {
            solve_time_ms: solve_time,
            num_variables: num_vars as u32,
            num_constraints: problem.constraints.len() as u32,
            num_integer_vars: num_integer,
            num_binary_vars: num_binary,
        };

        debug!(
            backend = %self.backend,
            problem = %problem.name,
            variables = num_vars,
            constraints = problem.constraints.len(),
            solve_time_ms = solve_time,
            "linear model solved"
        );

        match solution_result {
            Ok(variable_values) => {
                // Recompute with the original coefficients to undo the maximization negation
                let actual_obj: f64 = problem
                    .objective
                    .coefficients
                    .iter()
                    .zip(&variable_values)
                    .map(|(coeff, value)| coeff * value)
                    .sum();

                let mut solution = DomainSolution::optimal(actual_obj, variable_values)
                    .with_statistics(statistics);
                if !problem.name.is_empty() {
                    solution.message = format!("Optimal solution found for '{}'", problem.name);
                }
                Ok(solution)
            }
            Err(RunError::Resolution(ResolutionError::Infeasible)) => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            Err(RunError::Resolution(ResolutionError::Unbounded)) => Ok(DomainSolution::new(
                DomainSolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            )
            .with_statistics(statistics)),
            Err(RunError::Resolution(e)) => Err(SolverError::ExecutionFailed(e.to_string())),
            Err(RunError::Unavailable(backend)) => {
                Err(SolverError::SolverNotAvailable(backend.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        match self.backend {
            SolverBackend::Auto | SolverBackend::MicroLp => "microlp",
            SolverBackend::CoinCbc => "COIN-OR CBC",
            SolverBackend::Highs => "HiGHS",
            SolverBackend::Scip => "SCIP",
        }
    }
}
