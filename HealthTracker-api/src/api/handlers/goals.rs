use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::instrument;

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::entities::{GoalProgress, Goals, GoalsRequest};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;

/// Caller's daily goals
#[utoipa::path(
    get,
    path = "/api/v1/goals",
    responses(
        (status = 200, description = "Stored goals or the defaults", body = Goals),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user))]
pub async fn get_goals(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Goals>, ErrorResponse> {
    Ok(Json(state.goals.get(user.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/goals",
    request_body = GoalsRequest,
    responses(
        (status = 200, description = "Goals saved", body = Goals),
        (status = 400, description = "Goal below 100", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user, request))]
pub async fn set_goals(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<GoalsRequest>,
) -> Result<Json<Goals>, ErrorResponse> {
    Ok(Json(state.goals.set(user.user_id, request).await?))
}

/// Latest activity against the goals
#[utoipa::path(
    get,
    path = "/api/v1/goals/progress",
    responses(
        (status = 200, description = "Goal progress", body = GoalProgress),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user))]
pub async fn goal_progress(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<GoalProgress>, ErrorResponse> {
    Ok(Json(state.goals.progress(user.user_id).await?))
}
