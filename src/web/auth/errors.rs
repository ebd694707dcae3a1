use axum::{
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Missing or invalid Authorization header")]
    InvalidAuthorizationHeader,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account is disabled")]
    InactiveUser,
    #[error("Administrator rights required")]
    NotAdmin,
    #[error("Internal server error")]
    InternalServer,
}

impl IntoResponse for AuthenticationError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AuthenticationError::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
            AuthenticationError::InactiveUser | AuthenticationError::NotAdmin => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::UNAUTHORIZED,
        };

        let body = json!({
            "error": self.to_string()
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"admin\""),
            );
        }
        response
    }
}
