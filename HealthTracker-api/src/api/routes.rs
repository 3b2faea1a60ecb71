use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tracing::debug;

use health_tracker_domain::auth::{auth_middleware, authorize, configure_auth};

use crate::api::handlers::{
    account, auth, chat, fitness, goals, health, medications, medicines, reports, symptoms,
};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Doctor-only routes; authentication must run before authorization
    let doctor_routes = Router::new()
        .route("/doctor/patients", get(account::doctor_patients))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::require_role::<AppState>("doctor"),
        ));

    // Set up API routes that require authentication
    let api_routes = Router::new()
        .route(
            "/patients/:id/medications",
            get(medications::list_medications).post(medications::add_medication),
        )
        .route(
            "/medications/:id",
            put(medications::update_medication).delete(medications::delete_medication),
        )
        // Define specific routes before parametrized routes to avoid conflicts
        .route("/patients/:id/fitness/latest", get(fitness::latest_fitness))
        .route("/patients/:id/fitness", get(fitness::fitness_history))
        .route("/fitness/import", post(fitness::import_fitness))
        .route("/fitness/latest", put(fitness::update_latest_fitness))
        .route("/fitness", post(fitness::record_fitness))
        .route("/patients/:id/analytics", get(reports::patient_analytics))
        .route("/patients/:id/report", get(reports::patient_report))
        .route("/patients/:id/symptoms", get(symptoms::recent_symptoms))
        .route("/symptoms", post(symptoms::record_symptom))
        .route("/chat", post(chat::chat))
        .route("/goals/progress", get(goals::goal_progress))
        .route("/goals", get(goals::get_goals).put(goals::set_goals))
        .route("/medicines", get(medicines::list_medicines))
        .route("/medicines/:name", get(medicines::get_medicine))
        .route("/interactions/check", post(medicines::check_interactions))
        .route("/account", axum::routing::delete(account::delete_account))
        .merge(doctor_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("API routes configured");

    // Routes for any authenticated user
    let session_routes = Router::new()
        .route("/protected", get(auth::protected))
        .route("/healthdata", get(auth::health_data))
        .route("/auth/logout", post(auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    // Set up public routes that don't require authentication
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/seed-demo-users", post(auth::seed_demo_users))
        .route("/auth/refresh", post(auth::refresh_token));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .nest("/api/v1", api_routes)
        .with_state(state);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);

    // Apply security configuration
    let app = configure_auth(app);
    debug!("Security configuration applied");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
