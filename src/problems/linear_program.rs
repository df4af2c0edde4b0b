use super::{clean, parse_payload, run_linear};
use crate::domain::{
    Constraint, ConstraintType, LinearSolver, ObjectiveFunction, OptimizationProblem,
    OptimizationType, Payload, ProblemSolver, SolutionStatus, SolveContext, SolveError,
    SolverBackend, Variable, VariableType,
};
use crate::solver::SolverFactory;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const PROBLEM: &str = "linear_program";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinearProgramInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sense: Option<String>,
    objective: Vec<f64>,
    #[serde(default)]
    constraints: Vec<ConstraintInput>,
    #[serde(default)]
    variables: Vec<VariableInput>,
    #[serde(default)]
    backend: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintInput {
    coefficients: Vec<f64>,
    #[serde(rename = "type")]
    kind: String,
    bound: f64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariableInput {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    lower: Option<f64>,
    #[serde(default)]
    upper: Option<f64>,
}

impl LinearProgramInput {
    fn to_model(&self) -> Result<OptimizationProblem, SolveError> {
        let sense: OptimizationType = match &self.sense {
            Some(sense) => sense.parse().map_err(SolveError::InvalidPayload)?,
            None => OptimizationType::Minimize,
        };

        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let kind: ConstraintType = c
                    .kind
                    .parse()
                    .map_err(|e| SolveError::invalid(format!("constraint {}: {}", i, e)))?;
                Ok(Constraint::new(kind, c.coefficients.clone(), c.bound).with_name(&c.name))
            })
            .collect::<Result<Vec<_>, SolveError>>()?;

        let variables = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let kind: VariableType = match &v.kind {
                    Some(kind) => kind
                        .parse()
                        .map_err(|e| SolveError::invalid(format!("variable {}: {}", i, e)))?,
                    None => VariableType::Continuous,
                };
                let name = v.name.clone().unwrap_or_else(|| format!("x{}", i));
                let var = match kind {
                    VariableType::Continuous => Variable::continuous(name),
                    VariableType::Integer => Variable::integer(name),
                    VariableType::Binary => Variable::binary(name),
                };
                let lower = v.lower.unwrap_or(var.lower_bound);
                let upper = v.upper.or(var.upper_bound);
                Ok(var.with_bounds(lower, upper))
            })
            .collect::<Result<Vec<_>, SolveError>>()?;

        Ok(
            OptimizationProblem::new(ObjectiveFunction::new(sense, self.objective.clone()))
                .with_name(self.name.clone())
                .with_constraints(constraints)
                .with_variables(variables),
        )
    }

    fn variable_name(&self, index: usize) -> String {
        self.variables
            .get(index)
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| format!("x{}", index))
    }
}

/// General LP/MIP described directly in the payload
pub struct LinearProgramSolver {
    default_solver: Arc<dyn LinearSolver>,
}

impl LinearProgramSolver {
    pub fn new(default_solver: Arc<dyn LinearSolver>) -> Self {
        Self { default_solver }
    }

    fn solver_for(&self, backend: Option<&str>) -> Result<Arc<dyn LinearSolver>, SolveError> {
        match backend {
            None => Ok(self.default_solver.clone()),
            Some(name) => {
                let backend: SolverBackend = name.parse().map_err(SolveError::InvalidPayload)?;
                Ok(SolverFactory::create_from_backend(backend)?)
            }
        }
    }
}

impl ProblemSolver for LinearProgramSolver {
    fn solve(&self, payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError> {
        let input: LinearProgramInput = parse_payload(PROBLEM, payload)?;
        let model = input.to_model()?;
        let solver = self.solver_for(input.backend.as_deref())?;

        let solution = run_linear(solver.as_ref(), &model, ctx)?;
        match solution.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::Infeasible => return Err(SolveError::Infeasible(solution.message)),
            SolutionStatus::Unbounded => return Err(SolveError::Unbounded(solution.message)),
        }

        let variables: Vec<Value> = solution
            .variable_values
            .iter()
            .enumerate()
            .map(|(i, &value)| json!({"name": input.variable_name(i), "value": clean(value)}))
            .collect();
        let stats = &solution.statistics;

        Ok(json!({
            "status": solution.status.to_string(),
            "objective_value": solution.optimal_value.map(clean),
            "variables": variables,
            "solver": solver.name(),
            "message": solution.message,
            "statistics": {
                "solve_time_ms": stats.solve_time_ms,
                "num_variables": stats.num_variables,
                "num_constraints": stats.num_constraints,
                "num_integer_vars": stats.num_integer_vars,
                "num_binary_vars": stats.num_binary_vars,
            },
        }))
    }

    fn description(&self) -> &str {
        "Linear or mixed-integer program given as objective, constraints and variables"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CancellationToken;
    use crate::solver::GoodLpSolver;

    fn solve(value: Value) -> Result<Value, SolveError> {
        let solver = LinearProgramSolver::new(Arc::new(GoodLpSolver::microlp()));
        let ctx = SolveContext::new(CancellationToken::new());
        solver.solve(value.as_object().unwrap(), &ctx)
    }

    #[test]
    fn solves_production_planning() {
        let result = solve(json!({
            "name": "production",
            "sense": "maximize",
            "objective": [30.0, 50.0],
            "constraints": [
                {"coefficients": [2.0, 3.0], "type": "<=", "bound": 100.0},
                {"coefficients": [1.0, 1.0], "type": "<=", "bound": 40.0}
            ],
            "variables": [{"name": "chairs"}, {"name": "tables"}]
        }))
        .unwrap();

        assert_eq!(result["status"], "Optimal");
        assert!(
            (result["objective_value"].as_f64().unwrap() - 100.0 * 50.0 / 3.0).abs() < 1e-6
        );
        assert_eq!(result["variables"][0]["name"], "chairs");
        assert!(result["variables"][0]["value"].as_f64().unwrap().abs() < 1e-6);
        assert!((result["variables"][1]["value"].as_f64().unwrap() - 100.0 / 3.0).abs() < 1e-6);
        assert_eq!(result["solver"], "microlp");
    }

    #[test]
    fn binary_knapsack() {
        let result = solve(json!({
            "sense": "max",
            "objective": [10.0, 13.0, 7.0],
            "constraints": [{"coefficients": [4.0, 6.0, 3.0], "type": "<=", "bound": 9.0}],
            "variables": [{"type": "binary"}, {"type": "binary"}, {"type": "binary"}]
        }))
        .unwrap();

        assert!((result["objective_value"].as_f64().unwrap() - 20.0).abs() < 1e-6);
        assert_eq!(result["variables"][1]["name"], "x1");
        assert_eq!(result["statistics"]["num_binary_vars"], 3);
    }

    #[test]
    fn infeasible_program_reports_solver_message() {
        let err = solve(json!({
            "objective": [1.0],
            "constraints": [
                {"coefficients": [1.0], "type": ">=", "bound": 5.0},
                {"coefficients": [1.0], "type": "<=", "bound": 3.0}
            ]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            SolveError::Infeasible(
                "Problem is infeasible: no solution satisfies all constraints".to_string()
            )
        );
    }

    #[test]
    fn unknown_operator_is_invalid_payload() {
        let err = solve(json!({
            "objective": [1.0],
            "constraints": [{"coefficients": [1.0], "type": "<", "bound": 5.0}]
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "constraint 0: unknown constraint type '<' (expected <=, = or >=)"
        );
    }

    #[test]
    fn model_errors_are_forwarded() {
        let err = solve(json!({
            "objective": [1.0, 2.0],
            "constraints": [{"coefficients": [1.0], "type": "<=", "bound": 5.0}]
        }))
        .unwrap_err();

        assert!(matches!(err, SolveError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("Invalid problem:"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = solve(json!({"objective": [1.0], "backend": "gurobi"})).unwrap_err();
        assert!(err.to_string().starts_with("unknown solver backend 'gurobi'"));
    }
}
