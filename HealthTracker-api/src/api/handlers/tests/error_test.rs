#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use health_tracker_domain::services::ServiceError;

    use crate::api::handlers::error::ErrorResponse;

    fn status_of(err: ServiceError) -> StatusCode {
        ErrorResponse::from(err).into_response().status()
    }

    #[test]
    fn test_service_errors_map_to_statuses() {
        assert_eq!(status_of(ServiceError::ValidationError("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::Conflict("Email already registered".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ServiceError::Forbidden("no".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ServiceError::NotFound("gone".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::RepositoryError("db".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(ServiceError::External("llm".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let response = ErrorResponse::from(ServiceError::RepositoryError("disk I/O error at /data".into()));
        assert_eq!(response.error, "internal_error");
        assert_eq!(response.message, "An unexpected error occurred");
    }

    #[test]
    fn test_messages_are_kept_for_client_errors() {
        let response = ErrorResponse::from(ServiceError::NotFound("Patient 7 not found".into()));
        assert_eq!(response.error, "not_found");
        assert_eq!(response.message, "Patient 7 not found");
        assert!(response.details.is_none());
    }
}
