use axum::{
    extract::{Json, State},
    Extension,
};
use tracing::{debug, instrument};
use validator::Validate;

use health_tracker_domain::auth::UserInfo;
use health_tracker_domain::services::errors::validation_message;

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::chat::{ChatRequest, ChatResponse};

/// Ask the health assistant a question
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty or oversized query", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user, request))]
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    request
        .validate()
        .map_err(|e| ErrorResponse::validation_error(validation_message(&e)))?;

    if request.query.trim().is_empty() {
        return Err(ErrorResponse::validation_error("query: Query must not be blank"));
    }

    let response = state.chat.process_health_query(user.user_id, &request.query).await;
    debug!("Chat reply for user {} is {} bytes", user.user_id, response.len());

    Ok(Json(ChatResponse { response }))
}
