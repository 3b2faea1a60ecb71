use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{info, instrument};

use health_tracker_domain::auth::token::revoke_session;
use health_tracker_domain::auth::{Claims, UserInfo};
use health_tracker_domain::entities::User;
use health_tracker_domain::services::ServiceError;

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::chat::DeleteAccountRequest;
use crate::entities::common::MessageResponse;

/// Patients assigned to the calling doctor
#[utoipa::path(
    get,
    path = "/api/v1/doctor/patients",
    responses(
        (status = 200, description = "Assigned patients", body = Vec<User>),
        (status = 403, description = "Caller is not a doctor"),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
#[instrument(skip(state, user))]
pub async fn doctor_patients(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<Vec<User>>, ErrorResponse> {
    Ok(Json(state.users.patients_of_doctor(&user).await?))
}

/// Delete the caller's account and all of its records
#[utoipa::path(
    delete,
    path = "/api/v1/account",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Confirmation text did not match", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
#[instrument(skip(state, user, claims, request))]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    state.users.delete_account(&user, &request.confirmation).await?;
    revoke_session(&claims).map_err(ServiceError::from)?;

    info!("Account {} deleted", user.user_id);
    Ok(Json(MessageResponse::new("Account deleted")))
}
