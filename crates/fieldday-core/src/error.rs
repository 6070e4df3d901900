//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No draft or published state exists for the record.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// Publishing was attempted while required fields are blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_fields_lists_every_field() {
        let err = DomainError::MissingRequiredFields(vec!["name".into(), "location".into()]);

        assert_eq!(err.to_string(), "missing required fields: name, location");
    }
}
