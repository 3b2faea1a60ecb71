use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::{info, instrument};

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::entities::{Medication, MedicationRequest};

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::common::MessageResponse;

/// Medications of a patient, newest first
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/medications",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Medications of the patient", body = Vec<Medication>),
        (status = 403, description = "Caller may not view this patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user))]
pub async fn list_medications(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Medication>>, ErrorResponse> {
    let medications = state.medications.list(&user, id).await?;
    Ok(Json(medications))
}

/// Prescribe a medication (assigned doctor only)
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/medications",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    request_body = MedicationRequest,
    responses(
        (status = 201, description = "Medication added", body = Medication),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not the patient's doctor", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user, request))]
pub async fn add_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Json(request): Json<MedicationRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let medication = state.medications.add(&user, id, request).await?;
    info!("Medication {} created", medication.id);
    Ok((StatusCode::CREATED, Json(medication)))
}

#[utoipa::path(
    put,
    path = "/api/v1/medications/{id}",
    params(
        ("id" = i64, Path, description = "Medication ID")
    ),
    request_body = MedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = Medication),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not the patient's doctor", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user, request))]
pub async fn update_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Json(request): Json<MedicationRequest>,
) -> Result<Json<Medication>, ErrorResponse> {
    let medication = state.medications.update(&user, id, request).await?;
    Ok(Json(medication))
}

#[utoipa::path(
    delete,
    path = "/api/v1/medications/{id}",
    params(
        ("id" = i64, Path, description = "Medication ID")
    ),
    responses(
        (status = 200, description = "Medication deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the patient's doctor", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user))]
pub async fn delete_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    state.medications.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Medication deleted")))
}
