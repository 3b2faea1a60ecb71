use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::instrument;

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::entities::{Symptom, SymptomRequest};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/symptoms",
    request_body = SymptomRequest,
    responses(
        (status = 201, description = "Symptom recorded", body = Symptom),
        (status = 400, description = "Invalid symptom", body = ErrorResponse),
        (status = 403, description = "Only patients log symptoms", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "symptoms"
)]
#[instrument(skip(state, user, request))]
pub async fn record_symptom(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<SymptomRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let symptom = state.symptoms.record(&user, request).await?;
    Ok((StatusCode::CREATED, Json(symptom)))
}

/// The five most recent symptoms of a patient
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/symptoms",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Recent symptoms, newest first", body = Vec<Symptom>),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "symptoms"
)]
#[instrument(skip(state, user))]
pub async fn recent_symptoms(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Symptom>>, ErrorResponse> {
    Ok(Json(state.symptoms.recent(&user, id).await?))
}
