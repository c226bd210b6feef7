//! # Event Schemas
//!
//! One fixed schema per event kind. Every field is checked so a rejection
//! names all offending fields at once, not just the first.

use serde_json::{Map, Value};

use super::entities::{EventKind, VerificationEvent};
use super::errors::{FieldIssue, FieldProblem, ValidationError};

/// JSON type a schema field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A JSON number that fits a signed 64-bit integer (no fraction).
    Integer,
    /// A JSON string.
    String,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::Integer => "an integer",
            FieldType::String => "a string",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.as_i64().is_some(),
            FieldType::String => value.is_string(),
        }
    }
}

struct FieldSpec {
    name: &'static str,
    ty: FieldType,
}

const CARD_SCHEMA: [FieldSpec; 2] = [
    FieldSpec {
        name: "card_reader",
        ty: FieldType::Integer,
    },
    FieldSpec {
        name: "card_id",
        ty: FieldType::String,
    },
];

const FINGERPRINT_SCHEMA: [FieldSpec; 2] = [
    FieldSpec {
        name: "fingerprint_reader",
        ty: FieldType::Integer,
    },
    FieldSpec {
        name: "fingerprint_id",
        ty: FieldType::Integer,
    },
];

fn schema_for(kind: EventKind) -> &'static [FieldSpec] {
    match kind {
        EventKind::Card => &CARD_SCHEMA,
        EventKind::Fingerprint => &FINGERPRINT_SCHEMA,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(n) if n.is_i64() => "an integer",
        Value::Number(_) => "an out-of-range integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn check(object: &Map<String, Value>, schema: &[FieldSpec]) -> Vec<FieldIssue> {
    schema
        .iter()
        .filter_map(|spec| {
            let problem = match object.get(spec.name) {
                None => FieldProblem::Missing,
                Some(value) if spec.ty.accepts(value) => return None,
                Some(value) => FieldProblem::WrongType {
                    expected: spec.ty.name(),
                    found: json_type(value),
                },
            };
            Some(FieldIssue {
                field: spec.name,
                problem,
            })
        })
        .collect()
}

/// Validate `payload` against the schema for `kind`.
///
/// Extra fields are ignored. Nothing outside the payload is consulted.
pub fn validate(kind: EventKind, payload: &Value) -> Result<VerificationEvent, ValidationError> {
    let Value::Object(object) = payload else {
        return Err(ValidationError::NotAnObject {
            found: json_type(payload),
        });
    };

    let issues = check(object, schema_for(kind));
    if !issues.is_empty() {
        return Err(ValidationError::InvalidFields(issues));
    }

    // Schema check above guarantees the types below.
    let integer = |name: &str| object.get(name).and_then(Value::as_i64).unwrap_or_default();
    let event = match kind {
        EventKind::Card => VerificationEvent::Card {
            reader_id: integer("card_reader"),
            credential_id: object
                .get("card_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        EventKind::Fingerprint => VerificationEvent::Fingerprint {
            reader_id: integer("fingerprint_reader"),
            template_id: integer("fingerprint_id"),
        },
    };
    Ok(event)
}
