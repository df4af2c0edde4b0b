// Request and response types exchanged with the dispatcher

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Solver-specific input data, opaque to the dispatcher
pub type Payload = Map<String, Value>;

/// A problem identifier plus its payload. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRequest {
    problem: String,
    payload: Payload,
}

impl ProblemRequest {
    pub fn new(problem: impl Into<String>, payload: Payload) -> Self {
        Self {
            problem: problem.into(),
            payload,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_parts(self) -> (String, Payload) {
        (self.problem, self.payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStatus {
    Success,
    Error,
}

impl EnvelopeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopeStatus::Success => "success",
            EnvelopeStatus::Error => "error",
        }
    }
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a request resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure {
        message: String,
        correlation_id: Option<String>,
    },
}

/// Uniform response shape returned for every request
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    problem: String,
    outcome: Outcome,
}

impl ResponseEnvelope {
    pub fn success(problem: impl Into<String>, data: Value) -> Self {
        Self {
            problem: problem.into(),
            outcome: Outcome::Success(data),
        }
    }

    pub fn error(problem: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            outcome: Outcome::Failure {
                message: message.into(),
                correlation_id: None,
            },
        }
    }

    /// Error envelope for a fault whose details only live in the logs
    pub fn internal_error(problem: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        let correlation_id = correlation_id.into();
        Self {
            problem: problem.into(),
            outcome: Outcome::Failure {
                message: format!("Internal solver error (reference: {})", correlation_id),
                correlation_id: Some(correlation_id),
            },
        }
    }

    pub fn status(&self) -> EnvelopeStatus {
        match self.outcome {
            Outcome::Success(_) => EnvelopeStatus::Success,
            Outcome::Failure { .. } => EnvelopeStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == EnvelopeStatus::Success
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn data(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(data) => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure { message, .. } => Some(message),
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure {
                correlation_id: Some(id),
                ..
            } => Some(id),
            _ => None,
        }
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status().as_str())?;
        map.serialize_entry("problem", &self.problem)?;
        match &self.outcome {
            Outcome::Success(data) => map.serialize_entry("data", data)?,
            Outcome::Failure {
                message,
                correlation_id,
            } => {
                map.serialize_entry("message", message)?;
                if let Some(id) = correlation_id {
                    map.serialize_entry("correlation_id", id)?;
                }
            }
        }
        map.end()
    }
}
