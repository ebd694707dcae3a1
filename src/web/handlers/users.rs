use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::hash_password,
    models::{NewUser, UserRecord, UserUpdate},
    utils::state::AppState,
    web::error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub is_admin: bool,
}

/// Administrative edit; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub active: Option<bool>,
    pub is_admin: Option<bool>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repo.find_all().await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_password(&payload.password)?;
    let mut user = NewUser::new(payload.username, payload.email, password_hash);
    user.is_admin = payload.is_admin;

    let created = state.user_repo.insert_one(user).await?;
    tracing::info!("user {} created by {}", created.username, admin.username);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = payload
        .password
        .as_ref()
        .map(hash_password)
        .transpose()?;

    let update = UserUpdate {
        email: payload.email,
        password_hash,
        active: payload.active,
        is_admin: payload.is_admin,
    };

    let updated = state
        .user_repo
        .update_one(id, update)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    tracing::info!("user {} edited by {}", updated.username, admin.username);
    Ok(Json(updated))
}
