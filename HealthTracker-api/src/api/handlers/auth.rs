use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use tracing::{info, instrument, warn};

use health_tracker_domain::auth::logging::{log_failed_login, log_logout, log_successful_login, log_token_refresh};
use health_tracker_domain::auth::token::{self, TokenType};
use health_tracker_domain::auth::{issue_token_pair, Claims, UserInfo};
use health_tracker_domain::entities::{LoginRequest, RegistrationRequest};
use health_tracker_domain::services::ServiceError;

use crate::api::handlers::error::ErrorResponse;
use crate::api::state::AppState;
use crate::entities::auth::{
    HealthDataResponse, LoginFailure, LoginResponse, ProtectedResponse, RegisterResponse, SeedResponse,
    TokenRefreshRequest, TokenRefreshResponse,
};
use crate::entities::common::MessageResponse;

/// Best-effort client address for auth logs
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(LoginFailure { detail: "Invalid credentials".to_string() }),
    )
        .into_response()
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid request or email already registered", body = ErrorResponse),
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let user = state.users.register(request).await?;
    info!("Registered user {} as {}", user.id, user.role);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            email: user.email,
            role: user.role,
        }),
    ))
}

/// Exchange credentials for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginFailure),
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers, request))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let ip = client_ip(&headers);

    let user = match state.users.authenticate(&request.email, &request.password).await {
        Ok(user) => user,
        Err(ServiceError::InvalidCredentials) => {
            log_failed_login(&request.email, ip.as_deref(), "invalid credentials");
            return invalid_credentials();
        }
        Err(e) => return ErrorResponse::from(e).into_response(),
    };

    let identity = UserInfo {
        user_id: user.id,
        role: user.role,
        email: user.email.clone(),
        name: user.name.clone(),
    };

    match issue_token_pair(&identity) {
        Ok(pair) => {
            log_successful_login(&user.id.to_string(), user.role, ip.as_deref());
            Json(LoginResponse {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
                token_type: "bearer".to_string(),
                role: user.role,
                expires_in: pair.expires_in,
            })
            .into_response()
        }
        Err(e) => ErrorResponse::from(ServiceError::from(e)).into_response(),
    }
}

/// Create the demo doctor, patient and caregiver accounts
#[utoipa::path(
    post,
    path = "/seed-demo-users",
    responses(
        (status = 200, description = "Accounts created by this call", body = SeedResponse),
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn seed_demo_users(State(state): State<AppState>) -> Result<Json<SeedResponse>, ErrorResponse> {
    let created = state.users.seed_demo_users().await?;
    Ok(Json(SeedResponse { created }))
}

/// Issue a new access token from a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenRefreshResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, request))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, ErrorResponse> {
    let claims = token::validate_token(&request.refresh_token, TokenType::Refresh).map_err(|e| {
        warn!("Refresh rejected: {}", e);
        log_token_refresh("unknown", false, Some(&e.to_string()));
        ErrorResponse::unauthorized("Invalid refresh token")
    })?;

    let user = UserInfo::try_from(&claims).map_err(|_| ErrorResponse::unauthorized("Invalid refresh token"))?;

    // Deleted accounts keep no sessions, whichever device holds the token
    match state.users.get(user.user_id).await {
        Ok(_) => {}
        Err(ServiceError::NotFound(_)) => {
            log_token_refresh(&claims.sub, false, Some("account no longer exists"));
            return Err(ErrorResponse::unauthorized("Invalid refresh token"));
        }
        Err(e) => return Err(e.into()),
    }

    let access_token = token::generate_token(&user, TokenType::Access, &claims.sid).map_err(ServiceError::from)?;

    log_token_refresh(&claims.sub, true, None);

    Ok(Json(TokenRefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: TokenType::Access.expiration().num_seconds(),
    }))
}

/// Revoke the presented access token and its login session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "Authentication"
)]
#[instrument(skip(claims))]
pub async fn logout(Extension(claims): Extension<Claims>) -> Result<Json<MessageResponse>, ErrorResponse> {
    token::revoke_session(&claims).map_err(ServiceError::from)?;
    log_logout(&claims.sub);

    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// Echo the caller's token claims
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = 200, description = "Caller's claims", body = ProtectedResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "Authentication"
)]
#[instrument(skip(claims))]
pub async fn protected(Extension(claims): Extension<Claims>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You have accessed a protected endpoint".to_string(),
        user: claims,
    })
}

/// Caller's latest vitals
#[utoipa::path(
    get,
    path = "/healthdata",
    responses(
        (status = 200, description = "Latest fitness values", body = HealthDataResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, user))]
pub async fn health_data(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<HealthDataResponse>, ErrorResponse> {
    let latest = state.fitness.own_latest(user.user_id).await?;

    Ok(Json(HealthDataResponse {
        message: format!("Welcome {}", user.name),
        steps: latest.steps,
        calories: latest.calories,
        heart_rate: latest.heart_rate,
        sleep_hours: latest.sleep,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_uses_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));
    }
}
