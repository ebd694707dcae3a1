pub mod errors;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use errors::AuthenticationError;
use hyper::header;
use secrecy::SecretString;

use crate::{
    auth::{verify_password, DUMMY_HASH},
    utils::state::AppState,
};

/// Splits an `Authorization: Basic ...` value into username and password.
fn basic_credentials(value: &str) -> Option<(String, SecretString)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), SecretString::from(password.to_string())))
}

/// Guard for administrative routes: only active admin users get through.
///
/// The authenticated [`UserRecord`](crate::models::UserRecord) is inserted
/// into the request extensions.
pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, AuthenticationError> {
    let (username, password) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(basic_credentials)
        .ok_or(AuthenticationError::InvalidAuthorizationHeader)?;

    let user = state
        .user_repo
        .find_by_username(&username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user {username}: {e:?}");
            AuthenticationError::InternalServer
        })?;

    let Some(user) = user else {
        if let Err(e) = verify_password(&password, DUMMY_HASH) {
            tracing::error!("Failed to verify against the placeholder hash: {e}");
        }
        tracing::warn!("rejected admin login for unknown user {username}");
        return Err(AuthenticationError::InvalidCredentials);
    };

    let verified = verify_password(&password, &user.password_hash).map_err(|e| {
        tracing::error!("Failed to verify password of {username}: {e}");
        AuthenticationError::InternalServer
    })?;
    if !verified {
        tracing::warn!("rejected admin login for {username}");
        return Err(AuthenticationError::InvalidCredentials);
    }
    if !user.active {
        return Err(AuthenticationError::InactiveUser);
    }
    if !user.is_admin {
        return Err(AuthenticationError::NotAdmin);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::hash_password,
        models::{users, UserRecord},
        test_utils::test_app_state,
    };
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::StatusCode,
        routing::get,
        Extension, Router,
    };
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn user(username: &str, password: &str, active: bool, is_admin: bool) -> users::Model {
        users::Model {
            id: 1,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(&SecretString::from(password.to_string())).unwrap(),
            joined_at: Utc::now(),
            active,
            is_admin,
        }
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    async fn test_handler(Extension(user): Extension<UserRecord>) -> String {
        user.username
    }

    fn create_test_router(state: AppState) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(axum::middleware::from_fn_with_state(state.clone(), admin_auth))
            .with_state(state)
    }

    fn state_with_users(found: Vec<users::Model>) -> AppState {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<users::Model, Vec<_>, _>(vec![found])
            .into_connection();
        test_app_state(Some(Arc::new(db)))
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut request = Request::builder().uri("/test");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_basic_credentials_parsing() {
        let (username, _) = basic_credentials(&basic("admin", "pa:ss")).unwrap();
        assert_eq!(username, "admin");
        assert!(basic_credentials("Bearer abc").is_none());
        assert!(basic_credentials("Basic not-base64!").is_none());
        assert!(basic_credentials(&format!("Basic {}", STANDARD.encode("nocolon"))).is_none());
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let app = create_test_router(test_app_state(None));

        let (status, body) = call(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Missing or invalid Authorization header"));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let app = create_test_router(state_with_users(vec![]));

        let (status, body) = call(app, Some(basic("ghost", "password"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_unknown_user_looks_like_wrong_password() {
        let unknown = call(
            create_test_router(state_with_users(vec![])),
            Some(basic("ghost", "wrong")),
        )
        .await;
        let mismatch = call(
            create_test_router(state_with_users(vec![user("admin", "right", true, true)])),
            Some(basic("admin", "wrong")),
        )
        .await;
        assert_eq!(unknown, mismatch);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = create_test_router(state_with_users(vec![user("admin", "right", true, true)]));

        let (status, _) = call(app, Some(basic("admin", "wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let app = create_test_router(state_with_users(vec![user("bob", "secret", true, false)]));

        let (status, body) = call(app, Some(basic("bob", "secret"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Administrator rights required"));
    }

    #[tokio::test]
    async fn test_inactive_admin_is_forbidden() {
        let app = create_test_router(state_with_users(vec![user("old", "secret", false, true)]));

        let (status, body) = call(app, Some(basic("old", "secret"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Account is disabled"));
    }

    #[tokio::test]
    async fn test_successful_authentication() {
        let app = create_test_router(state_with_users(vec![user("admin", "secret", true, true)]));

        let (status, body) = call(app, Some(basic("admin", "secret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin");
    }
}
