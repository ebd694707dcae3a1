use axum::{http::StatusCode, response::IntoResponse, Json};
use sea_orm::SqlErr;
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::PasswordError, codec::FormatError, database::RepositoryError, models::ValidationError,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid pages: {0}")]
    InvalidPages(#[from] FormatError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            RepositoryError::StoreError(e)
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                Self::Conflict("entity already exists".to_string())
            }
            // A page list that fails to decode on the way out is corrupt data,
            // not bad input
            e => {
                tracing::error!("repository failure: {e}");
                Self::InternalServerError
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty => Self::Validation(ValidationError::MissingField("password")),
            e => {
                tracing::error!("password hashing failed: {e}");
                Self::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use ApiError::*;
        let status_code = match self {
            BadRequest(_) | InvalidPages(_) => StatusCode::BAD_REQUEST,
            Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            NotFound(_) => StatusCode::NOT_FOUND,
            Conflict(_) => StatusCode::CONFLICT,
            InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "error": self.to_string()
        });

        (status_code, Json(body)).into_response()
    }
}
