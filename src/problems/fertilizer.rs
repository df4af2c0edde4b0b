// Least-cost fertilizer blending.
//
// Each fertilizer has a unit cost and a nutrient fraction per unit of mass.
// We pick non-negative amounts minimising total cost such that every required
// nutrient lands inside its [min, max] window, optionally with a fixed total mass.

use super::{clean, parse_payload, run_linear};
use crate::domain::{
    Constraint, ConstraintType, LinearSolver, ObjectiveFunction, OptimizationProblem, Payload,
    ProblemSolver, SolutionStatus, SolveContext, SolveError, Variable,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

const PROBLEM: &str = "fertilizer";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FertilizerInput {
    fertilizers: Vec<FertilizerSpec>,
    requirements: BTreeMap<String, NutrientBounds>,
    #[serde(default)]
    total_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FertilizerSpec {
    name: String,
    cost: f64,
    #[serde(default)]
    nutrients: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NutrientBounds {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl FertilizerInput {
    fn validate(&self) -> Result<(), SolveError> {
        if self.fertilizers.is_empty() {
            return Err(SolveError::invalid("At least one fertilizer is required"));
        }

        let mut seen = HashSet::new();
        for fertilizer in &self.fertilizers {
            if fertilizer.name.trim().is_empty() {
                return Err(SolveError::invalid("Fertilizer names must not be empty"));
            }
            if !seen.insert(fertilizer.name.as_str()) {
                return Err(SolveError::invalid(format!(
                    "Duplicate fertilizer '{}'",
                    fertilizer.name
                )));
            }
            if !fertilizer.cost.is_finite() || fertilizer.cost < 0.0 {
                return Err(SolveError::invalid(format!(
                    "Fertilizer '{}' must have a finite, non-negative cost",
                    fertilizer.name
                )));
            }
            for (nutrient, fraction) in &fertilizer.nutrients {
                if !(0.0..=1.0).contains(fraction) {
                    return Err(SolveError::invalid(format!(
                        "Fertilizer '{}' has {} fraction {} outside [0, 1]",
                        fertilizer.name, nutrient, fraction
                    )));
                }
            }
        }

        if self.requirements.is_empty() {
            return Err(SolveError::invalid(
                "At least one nutrient requirement is required",
            ));
        }

        for (nutrient, bounds) in &self.requirements {
            match (bounds.min, bounds.max) {
                (None, None) => {
                    return Err(SolveError::invalid(format!(
                        "Requirement for {} needs a min or a max",
                        nutrient
                    )))
                }
                (Some(min), Some(max)) if min > max => {
                    return Err(SolveError::invalid(format!(
                        "Requirement for {} has min {} greater than max {}",
                        nutrient, min, max
                    )))
                }
                _ => {}
            }
            let mut values = bounds.min.iter().chain(bounds.max.iter());
            if values.any(|v| !v.is_finite() || *v < 0.0) {
                return Err(SolveError::invalid(format!(
                    "Requirement for {} must use finite, non-negative bounds",
                    nutrient
                )));
            }
        }

        if let Some(total) = self.total_amount {
            if !total.is_finite() || total <= 0.0 {
                return Err(SolveError::invalid("total_amount must be positive"));
            }
        }

        Ok(())
    }

    /// Nutrient fraction of every fertilizer, in fertilizer order
    fn fractions(&self, nutrient: &str) -> Vec<f64> {
        self.fertilizers
            .iter()
            .map(|f| f.nutrients.get(nutrient).copied().unwrap_or(0.0))
            .collect()
    }

    fn to_model(&self) -> OptimizationProblem {
        let costs = self.fertilizers.iter().map(|f| f.cost).collect();
        let variables = self
            .fertilizers
            .iter()
            .map(|f| Variable::continuous(f.name.clone()))
            .collect();

        let mut constraints = Vec::new();
        for (nutrient, bounds) in &self.requirements {
            let fractions = self.fractions(nutrient);
            if let Some(min) = bounds.min {
                constraints.push(
                    Constraint::new(ConstraintType::GreaterThanOrEqual, fractions.clone(), min)
                        .with_name(format!("{}_min", nutrient)),
                );
            }
            if let Some(max) = bounds.max {
                constraints.push(
                    Constraint::new(ConstraintType::LessThanOrEqual, fractions, max)
                        .with_name(format!("{}_max", nutrient)),
                );
            }
        }

        if let Some(total) = self.total_amount {
            constraints.push(
                Constraint::new(
                    ConstraintType::Equal,
                    vec![1.0; self.fertilizers.len()],
                    total,
                )
                .with_name("total_amount"),
            );
        }

        OptimizationProblem::new(ObjectiveFunction::minimize(costs))
            .with_name(PROBLEM)
            .with_variables(variables)
            .with_constraints(constraints)
    }
}

/// Least-cost blend of fertilizers meeting nutrient requirements
pub struct FertilizerSolver {
    solver: Arc<dyn LinearSolver>,
}

impl FertilizerSolver {
    pub fn new(solver: Arc<dyn LinearSolver>) -> Self {
        Self { solver }
    }
}

impl ProblemSolver for FertilizerSolver {
    fn solve(&self, payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError> {
        let input: FertilizerInput = parse_payload(PROBLEM, payload)?;
        input.validate()?;

        let solution = run_linear(self.solver.as_ref(), &input.to_model(), ctx)?;
        match solution.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::Infeasible => {
                return Err(SolveError::Infeasible(
                    "No blend satisfies the nutrient requirements".to_string(),
                ))
            }
            SolutionStatus::Unbounded => return Err(SolveError::Unbounded(solution.message)),
        }

        let amounts: Vec<f64> = solution.variable_values.iter().copied().map(clean).collect();

        let blend: Vec<Value> = input
            .fertilizers
            .iter()
            .zip(&amounts)
            .map(|(f, amount)| json!({"name": f.name, "amount": amount}))
            .collect();

        let mut nutrients = Map::new();
        for nutrient in input.requirements.keys() {
            let supplied: f64 = input
                .fractions(nutrient)
                .iter()
                .zip(&amounts)
                .map(|(fraction, amount)| fraction * amount)
                .sum();
            nutrients.insert(nutrient.clone(), json!(clean(supplied)));
        }

        Ok(json!({
            "total_cost": clean(solution.optimal_value.unwrap_or_default()),
            "total_amount": clean(amounts.iter().sum()),
            "blend": blend,
            "nutrients": nutrients,
        }))
    }

    fn description(&self) -> &str {
        "Least-cost fertilizer blend meeting nutrient requirements"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CancellationToken;
    use crate::solver::GoodLpSolver;

    fn solver() -> FertilizerSolver {
        FertilizerSolver::new(Arc::new(GoodLpSolver::microlp()))
    }

    fn ctx() -> SolveContext {
        SolveContext::new(CancellationToken::new())
    }

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn picks_the_cheapest_source_of_nitrogen() {
        let data = payload(json!({
            "fertilizers": [
                {"name": "urea", "cost": 0.5, "nutrients": {"N": 0.46}},
                {"name": "ammonium_nitrate", "cost": 0.6, "nutrients": {"N": 0.34}}
            ],
            "requirements": {"N": {"min": 23.0}}
        }));

        let result = solver().solve(&data, &ctx()).unwrap();

        // 50 units of urea supply 23 units of N for 25.0
        assert!((result["total_cost"].as_f64().unwrap() - 25.0).abs() < 1e-6);
        assert!((result["blend"][0]["amount"].as_f64().unwrap() - 50.0).abs() < 1e-6);
        assert_eq!(result["blend"][1]["amount"].as_f64().unwrap(), 0.0);
        assert!((result["nutrients"]["N"].as_f64().unwrap() - 23.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_total_amount_is_filled_with_filler() {
        let data = payload(json!({
            "fertilizers": [
                {"name": "urea", "cost": 0.5, "nutrients": {"N": 0.46}},
                {"name": "sand", "cost": 0.01}
            ],
            "requirements": {"N": {"min": 10.0, "max": 12.0}},
            "total_amount": 100.0
        }));

        let result = solver().solve(&data, &ctx()).unwrap();

        assert!((result["total_amount"].as_f64().unwrap() - 100.0).abs() < 1e-6);
        let n = result["nutrients"]["N"].as_f64().unwrap();
        assert!((10.0 - 1e-6..=12.0 + 1e-6).contains(&n));
    }

    #[test]
    fn unreachable_requirement_is_infeasible() {
        let data = payload(json!({
            "fertilizers": [{"name": "urea", "cost": 0.5, "nutrients": {"N": 0.46}}],
            "requirements": {"P": {"min": 5.0}}
        }));

        let err = solver().solve(&data, &ctx()).unwrap_err();

        assert_eq!(
            err,
            SolveError::Infeasible("No blend satisfies the nutrient requirements".to_string())
        );
    }

    #[test]
    fn rejects_fraction_above_one() {
        let data = payload(json!({
            "fertilizers": [{"name": "urea", "cost": 0.5, "nutrients": {"N": 46.0}}],
            "requirements": {"N": {"min": 5.0}}
        }));

        let err = solver().solve(&data, &ctx()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Fertilizer 'urea' has N fraction 46 outside [0, 1]"
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let err = solver()
            .solve(&payload(json!({"fertilizers": []})), &ctx())
            .unwrap_err();

        assert!(matches!(err, SolveError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("Invalid fertilizer payload"));
    }
}
