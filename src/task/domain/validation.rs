//! Field-level validation failures reported back to callers.

use super::TaskDomainError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field or query parameter.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found while validating one request.
///
/// Validation collects all failures rather than stopping at the first, so
/// callers can correct a whole submission at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("invalid input: {}", format_field_errors(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a field error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Records the error of a failed validation and returns its success value.
    pub fn check<T>(&mut self, result: Result<T, TaskDomainError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(FieldError::from(err));
                None
            }
        }
    }

    /// Returns `true` when no errors were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `true` when an error was recorded for `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Converts the collection into `Ok(())` when empty, or `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Returns `value` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when an error was recorded or `value` is missing.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(checked) if self.is_empty() => Ok(checked),
            _ => Err(self),
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl From<TaskDomainError> for FieldError {
    fn from(error: TaskDomainError) -> Self {
        Self::new(error.field().unwrap_or("task"), error.to_string())
    }
}
