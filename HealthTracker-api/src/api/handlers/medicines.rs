use axum::extract::{Json, Path, State};
use tracing::instrument;

use health_tracker_domain::entities::{InteractionCheckRequest, InteractionCheckResponse, Medicine};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;

/// Every seeded reference medicine
#[utoipa::path(
    get,
    path = "/api/v1/medicines",
    responses(
        (status = 200, description = "Reference medicines", body = Vec<Medicine>),
    ),
    security(("bearer" = [])),
    tag = "medicines"
)]
#[instrument(skip(state))]
pub async fn list_medicines(State(state): State<AppState>) -> Result<Json<Vec<Medicine>>, ErrorResponse> {
    Ok(Json(state.medicines.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/medicines/{name}",
    params(
        ("name" = String, Path, description = "Medicine name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Reference entry", body = Medicine),
        (status = 404, description = "Unknown medicine", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medicines"
)]
#[instrument(skip(state))]
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Medicine>, ErrorResponse> {
    Ok(Json(state.medicines.lookup(&name).await?))
}

/// Check a medication list for known interactions and duplicates
#[utoipa::path(
    post,
    path = "/api/v1/interactions/check",
    request_body = InteractionCheckRequest,
    responses(
        (status = 200, description = "Conflicts found, possibly none", body = InteractionCheckResponse),
        (status = 400, description = "Empty list or more than 50 medications", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medicines"
)]
#[instrument(skip(state, request))]
pub async fn check_interactions(
    State(state): State<AppState>,
    Json(request): Json<InteractionCheckRequest>,
) -> Result<Json<InteractionCheckResponse>, ErrorResponse> {
    let conflicts = state.interactions.check_request(&request).await?;
    Ok(Json(InteractionCheckResponse { conflicts }))
}
