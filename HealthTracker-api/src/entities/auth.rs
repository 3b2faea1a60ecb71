use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_tracker_domain::auth::Claims;
use health_tracker_domain::entities::Role;

/// Response to a successful registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
    pub role: Role,
}

/// Login response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Always `bearer`
    pub token_type: String,

    pub role: Role,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Body of a failed login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginFailure {
    pub detail: String,
}

/// Token refresh request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response of `/protected`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: Claims,
}

/// Caller's latest vitals, as shown on the dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthDataResponse {
    pub message: String,
    pub steps: i64,
    pub calories: i64,
    pub heart_rate: i64,
    pub sleep_hours: f64,
}

/// Emails created by the demo seeding endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    pub created: Vec<String>,
}
