use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{info, instrument};

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::entities::{FitnessEntry, FitnessRecord, ImportSummary};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::common::HistoryQuery;

/// Latest fitness record of a patient (zeros when nothing was logged)
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/fitness/latest",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Latest record", body = FitnessRecord),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "fitness"
)]
#[instrument(skip(state, user))]
pub async fn latest_fitness(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<Json<FitnessRecord>, ErrorResponse> {
    Ok(Json(state.fitness.latest(&user, id).await?))
}

/// Fitness history of a patient, newest first
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/fitness",
    params(
        ("id" = i64, Path, description = "Patient ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Fitness history", body = Vec<FitnessRecord>),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "fitness"
)]
#[instrument(skip(state, user))]
pub async fn fitness_history(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<FitnessRecord>>, ErrorResponse> {
    Ok(Json(state.fitness.history(&user, id, query.limit()).await?))
}

/// Log a fitness entry for the calling patient
#[utoipa::path(
    post,
    path = "/api/v1/fitness",
    request_body = FitnessEntry,
    responses(
        (status = 201, description = "Entry recorded", body = FitnessRecord),
        (status = 400, description = "Invalid entry", body = ErrorResponse),
        (status = 403, description = "Only patients record fitness data", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "fitness"
)]
#[instrument(skip(state, user, entry))]
pub async fn record_fitness(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(entry): Json<FitnessEntry>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let record = state.fitness.record(&user, user.user_id, entry).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Overwrite the calling patient's latest entry
#[utoipa::path(
    put,
    path = "/api/v1/fitness/latest",
    request_body = FitnessEntry,
    responses(
        (status = 200, description = "Latest entry updated", body = FitnessRecord),
        (status = 400, description = "Invalid entry", body = ErrorResponse),
        (status = 403, description = "Only patients record fitness data", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "fitness"
)]
#[instrument(skip(state, user, entry))]
pub async fn update_latest_fitness(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(entry): Json<FitnessEntry>,
) -> Result<Json<FitnessRecord>, ErrorResponse> {
    Ok(Json(state.fitness.update_latest(&user, user.user_id, entry).await?))
}

/// Import CSV rows for the calling patient
#[utoipa::path(
    post,
    path = "/api/v1/fitness/import",
    request_body(content = String, content_type = "text/csv", description = "Header row plus one row per entry"),
    responses(
        (status = 200, description = "Rows imported", body = ImportSummary),
        (status = 400, description = "Malformed or invalid CSV", body = ErrorResponse),
        (status = 403, description = "Rows belong to another user", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "fitness"
)]
#[instrument(skip(state, user, body))]
pub async fn import_fitness(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    body: String,
) -> Result<Json<ImportSummary>, ErrorResponse> {
    let summary = state.fitness.import_csv(&user, &body).await?;
    info!("User {} imported {} fitness rows", user.user_id, summary.imported);
    Ok(Json(summary))
}
