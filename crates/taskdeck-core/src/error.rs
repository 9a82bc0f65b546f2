//! Error types for taskdeck.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using taskdeck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Field-keyed validation messages, e.g. `{"due_date": ["Due date cannot be in the past"]}`.
///
/// Field names are part of the client contract and are reported verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Create an empty set of validation errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a message was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, if any.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when empty, otherwise `Err(Error::Validation(self))`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Core error type for taskdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Todo not found for the requesting owner
    #[error("Todo with id {0} not found")]
    TodoNotFound(i64),

    /// Category not found for the requesting owner
    #[error("Category with id {0} not found")]
    CategoryNotFound(i64),

    /// Tag not found for the requesting owner
    #[error("Tag with id {0} not found")]
    TagNotFound(i64),

    /// Caller-fixable input problem
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::field(field, message))
    }

    /// True for every "does not exist for this owner" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TodoNotFound(_) | Error::CategoryNotFound(_) | Error::TagNotFound(_)
        )
    }

    /// Validation details, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_todo_not_found() {
        let err = Error::TodoNotFound(42);
        assert_eq!(err.to_string(), "Todo with id 42 not found");
    }

    #[test]
    fn test_error_display_category_not_found() {
        let err = Error::CategoryNotFound(7);
        assert_eq!(err.to_string(), "Category with id 7 not found");
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::validation("due_date", "Due date cannot be in the past");
        assert_eq!(
            err.to_string(),
            "Validation failed: due_date: Due date cannot be in the past"
        );
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_is_not_found_covers_entity_variants() {
        assert!(Error::TodoNotFound(1).is_not_found());
        assert!(Error::CategoryNotFound(1).is_not_found());
        assert!(Error::TagNotFound(1).is_not_found());
        assert!(!Error::Internal("x".into()).is_not_found());
    }

    #[test]
    fn test_validation_errors_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        errors.add("title", "is too long");
        errors.add("description", "is too long");

        assert_eq!(errors.messages("title").unwrap().len(), 2);
        assert!(errors.has_field("description"));
        assert!(!errors.has_field("due_date"));
        assert_eq!(errors.to_string(), "description: is too long; title: can't be blank, is too long");
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let err = ValidationErrors::field("page", "bad").into_result().unwrap_err();
        assert!(err.validation_errors().unwrap().has_field("page"));
    }

    #[test]
    fn test_validation_errors_serialize_as_map() {
        let errors = ValidationErrors::field("category_id", "Category not found or not owned by user");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"category_id": ["Category not found or not owned by user"]})
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
