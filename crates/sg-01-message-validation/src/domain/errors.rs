//! # Validation Errors

use std::fmt;

use thiserror::Error;

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    /// The field is absent.
    Missing,
    /// The field is present with the wrong JSON type.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

/// A single offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "{} is missing", self.field),
            FieldProblem::WrongType { expected, found } => {
                write!(f, "{} must be {}, found {}", self.field, expected, found)
            }
        }
    }
}

/// Why a payload failed structural validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The payload is not a JSON object at all.
    #[error("Payload must be an object, found {found}")]
    NotAnObject { found: &'static str },

    /// One or more required fields are missing or mistyped.
    #[error("Invalid fields: {}", join_issues(.0))]
    InvalidFields(Vec<FieldIssue>),
}

impl ValidationError {
    /// Names of the offending fields, in schema order.
    #[must_use]
    pub fn offending_fields(&self) -> Vec<&'static str> {
        match self {
            ValidationError::NotAnObject { .. } => Vec::new(),
            ValidationError::InvalidFields(issues) => issues.iter().map(|i| i.field).collect(),
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
