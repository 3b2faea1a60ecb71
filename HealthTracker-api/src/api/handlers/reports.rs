use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use tracing::instrument;

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::entities::{AnalyticsSummary, WorkflowOutcome};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::common::HistoryQuery;

/// Steps, calories and heart-rate summary over recent history
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/analytics",
    params(
        ("id" = i64, Path, description = "Patient ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Analytics summary", body = AnalyticsSummary),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, user))]
pub async fn patient_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AnalyticsSummary>, ErrorResponse> {
    state.access.ensure_can_read(&user, id).await?;
    Ok(Json(state.analytics.summary(id, query.limit()).await?))
}

/// Run the interaction check, risk prediction and report for a patient
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/report",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Workflow outcome with report", body = WorkflowOutcome),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, user))]
pub async fn patient_report(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<Json<WorkflowOutcome>, ErrorResponse> {
    state.access.ensure_can_read(&user, id).await?;
    Ok(Json(state.workflow.run(id).await?))
}
