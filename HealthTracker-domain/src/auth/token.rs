use thiserror::Error;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Algorithm, Validation};
use std::env;
use tracing::{debug, error, info};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{Claims, UserInfo};
use crate::auth::token_blacklist;

/// Issuer used when `JWT_ISSUER` is unset
pub const DEFAULT_ISSUER: &str = "health-tracker";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// A refresh token was presented where an access token was expected, or vice versa
    #[error("Wrong token type: expected {0}")]
    WrongTokenType(String),

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Generic error
    #[error("Security error: {0}")]
    Generic(String),
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }

    /// Get the expiration duration for this token type
    pub fn expiration(&self) -> Duration {
        match self {
            TokenType::Access => {
                let seconds = env::var("JWT_EXP_SECONDS")
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(3600);

                Duration::seconds(seconds)
            },
            TokenType::Refresh => {
                let expiration_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(7);

                Duration::days(expiration_days)
            }
        }
    }
}

fn jwt_secret() -> Result<String, SecurityError> {
    env::var("JWT_SECRET").map_err(|e| {
        error!("JWT_SECRET environment variable not found: {}", e);
        SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
    })
}

fn jwt_issuer() -> String {
    env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string())
}

/// Generate a signed HS256 token for an authenticated user within login session `session_id`
pub fn generate_token(user: &UserInfo, token_type: TokenType, session_id: &str) -> Result<String, SecurityError> {
    let jwt_secret = jwt_secret()?;

    let now = Utc::now();
    let expiration = now + token_type.expiration();

    let claims = Claims {
        sub: user.user_id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        token_type: token_type.as_str().to_string(),
        jti: Uuid::new_v4().to_string(),
        sid: session_id.to_string(),
        iss: jwt_issuer(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    ).map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation (but not the token itself)
    info!("Generated {:?} token for user {}", token_type, user.user_id);
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a JWT and return its claims.
///
/// Fails when the signature, issuer or expiry are wrong, when the token type
/// does not match `expected`, or when the token was revoked.
pub fn validate_token(token: &str, expected: TokenType) -> Result<Claims, SecurityError> {
    let jwt_secret = jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[jwt_issuer()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    ).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        }
    })?;

    let claims = token_data.claims;

    if claims.token_type != expected.as_str() {
        return Err(SecurityError::WrongTokenType(expected.as_str().to_string()));
    }

    let revoked = token_blacklist::blacklist();
    if revoked.is_revoked(&claims.jti) || revoked.is_session_revoked(&claims.sid) {
        debug!("Token {} for user {} is revoked", claims.jti, claims.sub);
        return Err(SecurityError::TokenRevoked);
    }

    Ok(claims)
}

/// Revoke a token until its natural expiry
pub fn revoke_token(claims: &Claims) -> Result<(), SecurityError> {
    info!("Revoking token {} for user {}", claims.jti, claims.sub);

    token_blacklist::blacklist().revoke_token(&claims.jti, claims.exp);

    Ok(())
}

/// Revoke `claims` and every other token of its login session, refresh tokens included
pub fn revoke_session(claims: &Claims) -> Result<(), SecurityError> {
    revoke_token(claims)?;

    // Refresh tokens outlive the access token that carried the session id
    let until = Utc::now() + TokenType::Refresh.expiration();
    info!("Revoking session {} for user {}", claims.sid, claims.sub);
    token_blacklist::blacklist().revoke_session(&claims.sid, until.timestamp());

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::Role;

    pub(crate) fn setup_test_env() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        std::env::set_var("JWT_ISSUER", "test-issuer");
    }

    pub(crate) fn test_user(role: Role) -> UserInfo {
        UserInfo {
            user_id: 42,
            role,
            email: "user@example.com".to_string(),
            name: "Test User".to_string(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        setup_test_env();

        let token = generate_token(&test_user(Role::Doctor), TokenType::Access, "session-1").unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        setup_test_env();

        let token = generate_token(&test_user(Role::Patient), TokenType::Refresh, "session-2").unwrap();
        assert!(matches!(
            validate_token(&token, TokenType::Access),
            Err(SecurityError::WrongTokenType(_))
        ));
        assert!(validate_token(&token, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_token_expiration() {
        setup_test_env();

        let claims = Claims {
            sub: "42".to_string(),
            email: "user@example.com".to_string(),
            name: "Test User".to_string(),
            role: Role::Patient,
            token_type: "access".to_string(),
            jti: Uuid::new_v4().to_string(),
            sid: "session-4".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_only".as_bytes()),
        ).unwrap();

        match validate_token(&token, TokenType::Access) {
            Err(SecurityError::TokenExpired) => {},
            err => panic!("Expected TokenExpired error but got: {:?}", err),
        }
    }

    #[test]
    fn test_invalid_token() {
        setup_test_env();

        match validate_token("invalid.token.format", TokenType::Access) {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {},
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_revoked_token_is_rejected() {
        setup_test_env();

        let token = generate_token(&test_user(Role::Caregiver), TokenType::Access, "session-3").unwrap();
        let claims = validate_token(&token, TokenType::Access).unwrap();

        revoke_token(&claims).unwrap();
        assert!(matches!(
            validate_token(&token, TokenType::Access),
            Err(SecurityError::TokenRevoked)
        ));
    }

    #[test]
    fn test_revoked_session_rejects_refresh_token() {
        setup_test_env();

        let user = test_user(Role::Patient);
        let access = generate_token(&user, TokenType::Access, "session-5").unwrap();
        let refresh = generate_token(&user, TokenType::Refresh, "session-5").unwrap();
        let other = generate_token(&user, TokenType::Refresh, "session-6").unwrap();

        let claims = validate_token(&access, TokenType::Access).unwrap();
        revoke_session(&claims).unwrap();

        assert!(matches!(
            validate_token(&access, TokenType::Access),
            Err(SecurityError::TokenRevoked)
        ));
        assert!(matches!(
            validate_token(&refresh, TokenType::Refresh),
            Err(SecurityError::TokenRevoked)
        ));
        assert!(validate_token(&other, TokenType::Refresh).is_ok());
    }
}
