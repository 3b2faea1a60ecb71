use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entities::Role;

/// Authentication and authorization events written to the `auth` target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    Login,
    FailedLogin,
    Logout,
    TokenRefresh,
    /// Bearer token checked by the auth middleware or a role guard
    TokenValidation,
    Registration,
    AccountDeletion,
    AccessDenied,
}

impl AuthEventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthEventType::Login => "LOGIN",
            AuthEventType::FailedLogin => "FAILED_LOGIN",
            AuthEventType::Logout => "LOGOUT",
            AuthEventType::TokenRefresh => "TOKEN_REFRESH",
            AuthEventType::TokenValidation => "TOKEN_VALIDATION",
            AuthEventType::Registration => "REGISTRATION",
            AuthEventType::AccountDeletion => "ACCOUNT_DELETION",
            AuthEventType::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record. Built with [`AuthEvent::new`] and the `with_*` setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User id, or the submitted email when no account matched
    pub user: Option<String>,
    pub role: Option<Role>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path the event relates to
    pub resource: Option<String>,
    pub duration_ms: Option<u64>,
    /// "password", "jwt" or "rbac"
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user: user.map(String::from),
            role: None,
            timestamp: Utc::now(),
            ip_address: None,
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }

    /// `AUTH-LOG [type] [user] [status] [ip] [resource] details`
    pub fn render(&self) -> String {
        format!(
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            self.event_type,
            self.user.as_deref().unwrap_or("anonymous"),
            if self.success { "SUCCESS" } else { "FAILURE" },
            self.ip_address.as_deref().unwrap_or("-"),
            self.resource.as_deref().unwrap_or("-"),
            self.details.as_deref().unwrap_or(""),
        )
    }
}

/// Write an event; failed logins and denials go out at `warn`
pub fn log_auth_event(event: AuthEvent) {
    let line = event.render();
    let role = event.role.map(|r| r.as_str());

    match (event.event_type, event.success) {
        (AuthEventType::FailedLogin | AuthEventType::AccessDenied, _) | (_, false) => warn!(
            target: "auth",
            event_type = %event.event_type,
            role,
            duration_ms = event.duration_ms,
            method = event.auth_method.as_deref(),
            "{}",
            line
        ),
        _ => info!(
            target: "auth",
            event_type = %event.event_type,
            role,
            duration_ms = event.duration_ms,
            method = event.auth_method.as_deref(),
            "{}",
            line
        ),
    }
}

pub fn log_successful_login(user_id: &str, role: Role, ip_address: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Login, Some(user_id), true)
        .with_role(role)
        .with_auth_method("password");

    if let Some(ip) = ip_address {
        event = event.with_ip(ip);
    }

    log_auth_event(event);
}

pub fn log_failed_login(email: &str, ip_address: Option<&str>, reason: &str) {
    let mut event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");

    if let Some(ip) = ip_address {
        event = event.with_ip(ip);
    }

    log_auth_event(event);
}

pub fn log_token_refresh(user_id: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, Some(user_id), success).with_auth_method("jwt");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}

pub fn log_logout(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Logout, Some(user_id), true).with_details("Session revoked"));
}

pub fn log_registration(email: &str, role: Role, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(email), success)
        .with_role(role)
        .with_auth_method("password");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}

pub fn log_account_deletion(user_id: &str) {
    let event = AuthEvent::new(AuthEventType::AccountDeletion, Some(user_id), true)
        .with_details("Account and related records deleted");
    log_auth_event(event);
}

/// A role guard refused the caller
pub fn log_access_denied(user_id: &str, role: Role, resource: &str, required_roles: &[String]) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
        .with_role(role)
        .with_resource(resource)
        .with_details(format!("Required roles: {}", required_roles.join(", ")))
        .with_auth_method("rbac");

    log_auth_event(event);
}
