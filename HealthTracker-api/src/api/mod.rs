pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;

use health_tracker_data::database::DatabasePool;

pub use state::AppState;

/// Create the application router over `pool`
pub fn create_application(pool: DatabasePool) -> Router {
    routes::create_app(AppState::new(pool))
}
