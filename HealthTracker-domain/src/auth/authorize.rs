use axum::{
    extract::State,
    middleware::Next,
    response::{Response, IntoResponse},
    body::Body,
    http::{Request, StatusCode},
    Json,
};
use tracing::{debug, warn};
use serde_json::json;
use futures::future::BoxFuture;

use crate::auth::UserInfo;
use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType, log_access_denied};

/// Middleware for role-based access control
///
/// Lets the request through when the authenticated user holds any of
/// `required_roles`, otherwise answers 403. Must run after `auth_middleware`.
pub async fn require_roles<S, I>(
    _state: State<S>,
    req: Request<Body>,
    next: Next,
    required_roles: I,
) -> Response
where
    I: IntoIterator<Item = String>,
{
    let required_roles: Vec<String> = required_roles.into_iter().collect();
    let request_path = req.uri().path().to_string();

    match req.extensions().get::<UserInfo>() {
        Some(user) => {
            let user_id = user.user_id.to_string();

            if required_roles.iter().any(|role| role == user.role.as_str()) {
                debug!("User {} ({}) authorized for {}", user_id, user.role, request_path);

                let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&user_id), true)
                    .with_details(format!("Role {} authorized", user.role))
                    .with_resource(request_path)
                    .with_auth_method("rbac");
                log_auth_event(event);

                next.run(req).await
            } else {
                warn!("User {} lacks required roles {:?} for {}", user_id, required_roles, request_path);
                log_access_denied(&user_id, user.role, &request_path, &required_roles);

                (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "forbidden",
                        "message": "You don't have the required permissions to access this resource",
                        "required_roles": required_roles
                    }))
                ).into_response()
            }
        }
        None => {
            // auth_middleware was not layered in front of this one
            warn!("No user info found in request extensions for path: {}", request_path);

            let event = AuthEvent::new(AuthEventType::AccessDenied, None, false)
                .with_details("Authentication context missing in request extensions")
                .with_resource(request_path)
                .with_auth_method("rbac");
            log_auth_event(event);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Authentication context missing"
                }))
            ).into_response()
        }
    }
}

/// Middleware factory that requires a specific role for access
///
/// ```ignore
/// let doctor_routes = Router::new()
///    .route("/doctor/patients", get(list_patients))
///    .layer(middleware::from_fn_with_state(state.clone(), require_role("doctor")));
/// ```
pub fn require_role<S: Clone + Send + Sync + 'static>(role: &str) -> impl Fn(State<S>, Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let role = role.to_string();
    move |state, req, next| {
        let roles = vec![role.clone()];
        Box::pin(async move { require_roles(state, req, next, roles).await })
    }
}

/// Middleware factory that requires any of the specified roles for access
pub fn require_any_role<S: Clone + Send + Sync + 'static>(roles: &[&str]) -> impl Fn(State<S>, Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    move |state, req, next| {
        let roles = roles.clone();
        Box::pin(async move { require_roles(state, req, next, roles).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    use crate::auth::token::tests::test_user;
    use crate::entities::Role;

    /// Router whose single route is guarded by `guard`, with `user` injected
    /// ahead of it the way `auth_middleware` would
    fn guarded<F>(guard: F, user: Option<UserInfo>) -> Router
    where
        F: Fn(State<()>, Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static,
    {
        Router::new()
            .route("/doctor/patients", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state((), guard))
            .layer(middleware::from_fn(move |mut req: Request<Body>, next: Next| {
                let user = user.clone();
                async move {
                    if let Some(user) = user {
                        req.extensions_mut().insert(user);
                    }
                    next.run(req).await
                }
            }))
    }

    async fn status_for(router: Router) -> StatusCode {
        router
            .oneshot(Request::builder().uri("/doctor/patients").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_require_role_with_matching_role() {
        let router = guarded(require_role::<()>("doctor"), Some(test_user(Role::Doctor)));
        assert_eq!(status_for(router).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_require_role_with_other_role() {
        let router = guarded(require_role::<()>("doctor"), Some(test_user(Role::Patient)));
        assert_eq!(status_for(router).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_require_any_role() {
        let roles = ["doctor", "caregiver"];
        let caregiver = guarded(require_any_role::<()>(&roles), Some(test_user(Role::Caregiver)));
        let patient = guarded(require_any_role::<()>(&roles), Some(test_user(Role::Patient)));

        assert_eq!(status_for(caregiver).await, StatusCode::OK);
        assert_eq!(status_for(patient).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_user_context_is_server_error() {
        let router = guarded(require_role::<()>("doctor"), None);
        assert_eq!(status_for(router).await, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
