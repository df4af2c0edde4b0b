use crate::domain::{Payload, ProblemSolver, SolveContext, SolveError};
use serde_json::Value;

/// Returns its payload unchanged. Handy for checking the service end to end.
#[derive(Debug, Default)]
pub struct EchoSolver;

impl ProblemSolver for EchoSolver {
    fn solve(&self, payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError> {
        ctx.checkpoint()?;
        Ok(Value::Object(payload.clone()))
    }

    fn description(&self) -> &str {
        "Returns the payload unchanged"
    }
}
