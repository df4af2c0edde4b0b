// Mappers: Convert between the HTTP wire format and domain types
// Keeps JSON request handling out of the dispatcher.

use crate::domain::{Payload, ProblemRequest, ResponseEnvelope};
use serde_json::Value;

/// Parse a `POST /api/solve` body into a ProblemRequest.
///
/// Malformed bodies are answered with an error envelope rather than a
/// transport error; `problem` is echoed back whenever it could be read.
pub fn request_from_json(body: &[u8]) -> Result<ProblemRequest, Box<ResponseEnvelope>> {
    let invalid = |problem: &str, reason: String| {
        Box::new(ResponseEnvelope::error(
            problem,
            format!("Invalid request: {}", reason),
        ))
    };

    let value: Value = serde_json::from_slice(body).map_err(|e| invalid("", e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(invalid("", "body must be a JSON object".to_string()));
    };

    let problem = match fields.remove("problem") {
        Some(Value::String(problem)) => problem,
        Some(_) => return Err(invalid("", "field `problem` must be a string".to_string())),
        None => return Err(invalid("", "missing field `problem`".to_string())),
    };

    let payload: Payload = match fields.remove("data") {
        None | Some(Value::Null) => Payload::new(),
        Some(Value::Object(data)) => data,
        Some(_) => {
            return Err(invalid(
                &problem,
                "field `data` must be an object".to_string(),
            ))
        }
    };

    Ok(ProblemRequest::new(problem, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(envelope: &ResponseEnvelope) -> &str {
        envelope.message().unwrap()
    }

    #[test]
    fn parses_problem_and_data() {
        let request = request_from_json(br#"{"problem": "echo", "data": {"x": 1}}"#).unwrap();
        assert_eq!(request.problem(), "echo");
        assert_eq!(request.payload().get("x"), Some(&json!(1)));
    }

    #[test]
    fn missing_data_is_an_empty_payload() {
        let request = request_from_json(br#"{"problem": "echo"}"#).unwrap();
        assert!(request.payload().is_empty());
    }

    #[test]
    fn non_object_data_echoes_problem() {
        let envelope = request_from_json(br#"{"problem": "sudoku", "data": [1, 2]}"#).unwrap_err();
        assert_eq!(envelope.problem(), "sudoku");
        assert_eq!(
            message(&envelope),
            "Invalid request: field `data` must be an object"
        );
    }

    #[test]
    fn garbage_body_is_an_error_envelope() {
        let envelope = request_from_json(b"not json").unwrap_err();
        assert_eq!(envelope.problem(), "");
        assert!(message(&envelope).starts_with("Invalid request: "));
    }

    #[test]
    fn missing_problem_is_reported() {
        let envelope = request_from_json(br#"{"data": {}}"#).unwrap_err();
        assert_eq!(message(&envelope), "Invalid request: missing field `problem`");
    }
}
