use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the `bearer` JWT scheme referenced by protected paths
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::seed_demo_users,
        crate::api::handlers::auth::refresh_token,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::protected,
        crate::api::handlers::auth::health_data,

        // Medication endpoints
        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::add_medication,
        crate::api::handlers::medications::update_medication,
        crate::api::handlers::medications::delete_medication,

        // Fitness endpoints
        crate::api::handlers::fitness::latest_fitness,
        crate::api::handlers::fitness::fitness_history,
        crate::api::handlers::fitness::record_fitness,
        crate::api::handlers::fitness::update_latest_fitness,
        crate::api::handlers::fitness::import_fitness,

        // Reports
        crate::api::handlers::reports::patient_analytics,
        crate::api::handlers::reports::patient_report,

        crate::api::handlers::chat::chat,

        crate::api::handlers::goals::get_goals,
        crate::api::handlers::goals::set_goals,
        crate::api::handlers::goals::goal_progress,

        crate::api::handlers::symptoms::record_symptom,
        crate::api::handlers::symptoms::recent_symptoms,

        crate::api::handlers::medicines::list_medicines,
        crate::api::handlers::medicines::get_medicine,
        crate::api::handlers::medicines::check_interactions,

        crate::api::handlers::account::doctor_patients,
        crate::api::handlers::account::delete_account
    ),
    components(
        schemas(
            // API entities
            crate::entities::auth::RegisterResponse,
            crate::entities::auth::LoginResponse,
            crate::entities::auth::LoginFailure,
            crate::entities::auth::TokenRefreshRequest,
            crate::entities::auth::TokenRefreshResponse,
            crate::entities::auth::ProtectedResponse,
            crate::entities::auth::HealthDataResponse,
            crate::entities::auth::SeedResponse,
            crate::entities::chat::ChatRequest,
            crate::entities::chat::ChatResponse,
            crate::entities::chat::DeleteAccountRequest,
            crate::entities::common::MessageResponse,
            crate::entities::common::HistoryQuery,
            crate::api::handlers::error::ErrorResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,

            // Domain schemas
            health_tracker_domain::auth::Claims,
            health_tracker_domain::auth::UserInfo,
            health_tracker_domain::entities::Role,
            health_tracker_domain::entities::User,
            health_tracker_domain::entities::RegistrationRequest,
            health_tracker_domain::entities::LoginRequest,
            health_tracker_domain::entities::Medication,
            health_tracker_domain::entities::MedicationRequest,
            health_tracker_domain::entities::Medicine,
            health_tracker_domain::entities::InteractionCheckRequest,
            health_tracker_domain::entities::InteractionCheckResponse,
            health_tracker_domain::entities::FitnessRecord,
            health_tracker_domain::entities::FitnessEntry,
            health_tracker_domain::entities::ImportSummary,
            health_tracker_domain::entities::AnalyticsSummary,
            health_tracker_domain::entities::RiskLevel,
            health_tracker_domain::entities::RiskAssessment,
            health_tracker_domain::entities::HealthReport,
            health_tracker_domain::entities::WorkflowOutcome,
            health_tracker_domain::entities::Goals,
            health_tracker_domain::entities::GoalsRequest,
            health_tracker_domain::entities::GoalProgress,
            health_tracker_domain::entities::Severity,
            health_tracker_domain::entities::Symptom,
            health_tracker_domain::entities::SymptomRequest
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "Authentication", description = "Registration, login and token endpoints"),
        (name = "medications", description = "Prescribed medications per patient"),
        (name = "fitness", description = "Self-reported fitness data"),
        (name = "reports", description = "Analytics and health reports"),
        (name = "chat", description = "Health assistant chatbot"),
        (name = "goals", description = "Daily step and calorie goals"),
        (name = "symptoms", description = "Symptom log"),
        (name = "medicines", description = "Medicine reference data and interaction checks"),
        (name = "account", description = "Account management")
    ),
    info(
        title = "HealthTracker API",
        version = "0.1.0",
        description = "Multi-role health tracking: fitness, medications, chatbot and risk reports",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthTracker API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are defined");
        assert!(tags.iter().any(|tag| tag.name == "medications"));
        assert!(tags.iter().any(|tag| tag.name == "Authentication"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/login"));
        assert!(paths.contains_key("/api/v1/patients/{id}/medications"));
        assert!(paths.contains_key("/api/v1/patients/{id}/report"));
        assert!(paths.contains_key("/api/v1/fitness/import"));
        assert!(paths.contains_key("/api/v1/chat"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components are defined");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
