//! Authentication for the HealthTracker API
//!
//! Issues and validates JWTs, hashes passwords and provides the middleware
//! that puts the caller's [`UserInfo`] into request extensions.

use axum::{
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
    body::Body,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::entities::Role;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod token;

pub mod token_blacklist;

pub mod password;

// Role-based access control layers
pub mod authorize;

pub mod logging;

/// Claims carried by every access and refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// "access" or "refresh"
    pub token_type: String,
    /// Unique token id, used for revocation
    pub jti: String,
    /// Login session shared by an access/refresh pair and renewed access tokens
    pub sid: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// The authenticated caller, as seen by handlers and services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserInfo {
    pub user_id: i64,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl TryFrom<&Claims> for UserInfo {
    type Error = token::SecurityError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| token::SecurityError::InvalidToken)?;

        Ok(UserInfo {
            user_id,
            role: claims.role,
            email: claims.email.clone(),
            name: claims.name.clone(),
        })
    }
}

/// Access and refresh token issued at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Issue a fresh access/refresh pair for `user`, opening a new login session
pub fn issue_token_pair(user: &UserInfo) -> Result<TokenPair, token::SecurityError> {
    let session_id = uuid::Uuid::new_v4().to_string();

    Ok(TokenPair {
        access_token: token::generate_token(user, token::TokenType::Access, &session_id)?,
        refresh_token: token::generate_token(user, token::TokenType::Refresh, &session_id)?,
        expires_in: token::TokenType::Access.expiration().num_seconds(),
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .filter(|t| !t.is_empty())
        .ok_or("Authorization header does not contain Bearer token")
}

fn unauthorized() -> Response {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(Body::empty())
        .unwrap_or_default()
}

/// Authentication middleware for protected routes
#[cfg(feature = "with-api")]
pub async fn auth_middleware<S>(
    _state: State<S>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let start_time = std::time::Instant::now();

    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_string(),
        Err(reason) => {
            debug!("Rejecting request to {}: {}", request_path, reason);

            let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details(reason)
                .with_resource(request_path)
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            return unauthorized();
        }
    };

    let validated = token::validate_token(&token, token::TokenType::Access)
        .and_then(|claims| UserInfo::try_from(&claims).map(|user| (claims, user)));

    match validated {
        Ok((claims, user_info)) => {
            debug!("Token validated for user: {}", claims.sub);

            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                .with_resource(request_path)
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            req.extensions_mut().insert(user_info);
            req.extensions_mut().insert(claims);

            next.run(req).await
        }
        Err(e) => {
            warn!("Token rejected for {}: {}", request_path, e);

            let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details(e.to_string())
                .with_resource(request_path)
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            unauthorized()
        }
    }
}

/// Configure CORS and security headers for the application
#[cfg(feature = "with-api")]
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;
    use axum::http::{HeaderName, HeaderValue, Method};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    app.layer(cors).layer(security_headers)
}
