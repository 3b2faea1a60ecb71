use thiserror::Error;
use validator::ValidationErrors;

use health_tracker_data::repository::RepositoryError;

use crate::auth::token::SecurityError;

/// Errors shared by all domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// The actor may not perform the operation on this record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflicts with existing data (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Login failed; deliberately carries no detail
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Failure in an external dependency (LLM provider, token signing)
    #[error("External service error: {0}")]
    External(String),
}

/// Map repository errors to service errors
pub fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Validation(msg) => ServiceError::ValidationError(msg),
        RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
        _ => ServiceError::RepositoryError(err.to_string()),
    }
}

impl From<SecurityError> for ServiceError {
    fn from(err: SecurityError) -> Self {
        ServiceError::External(err.to_string())
    }
}

/// Flatten validator errors into `field: message; field: message`
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();

    // field_errors() is a HashMap; keep messages stable
    fields.sort();
    fields.join("; ")
}

/// Run `validator` checks and convert failures into [`ServiceError::ValidationError`]
pub fn validate<T: validator::Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|errors| ServiceError::ValidationError(validation_message(&errors)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GoalsRequest;

    #[test]
    fn test_validation_message_names_fields() {
        let request = GoalsRequest { steps_goal: 10, calories_goal: 50 };
        let err = validate(&request).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation error: calories_goal: Calories goal must be at least 100; steps_goal: Steps goal must be at least 100"
        );
    }

    #[test]
    fn test_conflict_survives_mapping() {
        let mapped = map_repo_error(RepositoryError::Conflict("User already exists".to_string()));
        assert!(matches!(mapped, ServiceError::Conflict(msg) if msg == "User already exists"));
    }
}
