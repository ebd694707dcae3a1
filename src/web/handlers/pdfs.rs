use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Form,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    codec::pages,
    models::{NewPdf, UserRecord},
    utils::state::AppState,
    web::error::ApiError,
};

/// Upload form posted by the browser page.
#[derive(Debug, Default, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file_path: String,
    /// Comma separated page numbers, e.g. `1, 3, 2`.
    #[serde(default)]
    pub pages: String,
}

/// JSON body of `POST /pdfs`.
///
/// Pages are taken as raw JSON values and coerced like form input, so a bad
/// entry is reported as an invalid page list rather than a body error.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePdfRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub pages: Vec<Value>,
}

impl CreatePdfRequest {
    fn into_new_pdf(self) -> Result<NewPdf, ApiError> {
        let entries = self.pages.into_iter().map(|entry| match entry {
            Value::String(s) => s,
            other => other.to_string(),
        });
        let pages = pages::parse_entries(entries)?;
        Ok(NewPdf::new(self.title, self.file_path, pages))
    }
}

// Handler for the upload form
pub async fn save(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<impl IntoResponse, ApiError> {
    let pages = pages::parse_input(&form.pages).map_err(|e| {
        tracing::info!("rejected page list {:?}: {e}", form.pages);
        ApiError::InvalidPages(e)
    })?;

    let record = state
        .pdf_repo
        .insert_one(NewPdf::new(form.title, form.file_path, pages))
        .await?;
    tracing::info!(id = record.id, pages = ?record.pages, "print job saved");

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn create_pdf(
    State(state): State<AppState>,
    payload: Result<Json<CreatePdfRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let pdf = payload.into_new_pdf()?;

    let record = state.pdf_repo.insert_one(pdf).await?;
    tracing::info!(id = record.id, pages = ?record.pages, "print job created");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_pdfs(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = state.pdf_repo.find_all().await?;
    Ok(Json(records))
}

pub async fn get_pdf(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .pdf_repo
        .find_one_by(id)
        .await?
        .ok_or(ApiError::NotFound("pdf"))?;
    Ok(Json(record))
}

pub async fn delete_pdf(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.pdf_repo.delete_by(id).await? {
        return Err(ApiError::NotFound("pdf"));
    }
    tracing::info!("pdf {id} deleted by {}", admin.username);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::FormatError, models::pdfs, models::ValidationError, test_utils::test_app_state,
    };
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;

    fn stored(id: i32, pages: &str) -> pdfs::Model {
        pdfs::Model {
            id,
            title: "Menu".to_string(),
            created_at: Utc::now(),
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: pages.to_string(),
        }
    }

    fn admin() -> UserRecord {
        UserRecord {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            joined_at: Utc::now(),
            active: true,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_save_creates_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<pdfs::Model, Vec<_>, _>(vec![vec![stored(1, "1,3,2")]])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let form = SaveForm {
            title: "Menu".to_string(),
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: "1, 3, 2".to_string(),
        };
        let response = save(State(state), Form(form))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_save_rejects_malformed_pages() {
        let state = test_app_state(None);
        let form = SaveForm {
            title: "Menu".to_string(),
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: "3,x,5".to_string(),
        };

        let result = save(State(state), Form(form)).await;
        assert!(matches!(
            result,
            Err(ApiError::InvalidPages(FormatError::InvalidPage { position: 1, .. }))
        ));
    }

    #[tokio::test]
    async fn test_save_requires_title() {
        let state = test_app_state(None);
        let form = SaveForm {
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: "1".to_string(),
            ..Default::default()
        };

        let result = save(State(state), Form(form)).await;
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::MissingField("title")))
        ));
    }

    #[tokio::test]
    async fn test_create_pdf() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<pdfs::Model, Vec<_>, _>(vec![vec![stored(4, "5,5")]])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let request = CreatePdfRequest {
            title: "Menu".to_string(),
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: vec![json!(5), json!("5")],
        };
        let response = create_pdf(State(state), Ok(Json(request)))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_pdf_rejects_bad_entries() {
        for (pages, position) in [
            (vec![json!(1), json!("x"), json!(5)], 1),
            (vec![json!(-1)], 0),
            (vec![json!(2), json!(1.5)], 1),
            (vec![json!(null)], 0),
        ] {
            let request = CreatePdfRequest {
                title: "Menu".to_string(),
                file_path: "/srv/uploads/menu.pdf".to_string(),
                pages,
            };
            let result = create_pdf(State(test_app_state(None)), Ok(Json(request))).await;
            assert!(matches!(
                result,
                Err(ApiError::InvalidPages(FormatError::InvalidPage { position: p, .. })) if p == position
            ));
        }
    }

    #[tokio::test]
    async fn test_create_pdf_requires_title() {
        let request = CreatePdfRequest {
            file_path: "/srv/uploads/menu.pdf".to_string(),
            pages: vec![json!(1)],
            ..Default::default()
        };

        let result = create_pdf(State(test_app_state(None)), Ok(Json(request))).await;
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::MissingField("title")))
        ));
    }

    #[tokio::test]
    async fn test_get_pdf_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<pdfs::Model, Vec<_>, _>(vec![vec![]])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let result = get_pdf(State(state), Path(12)).await;
        assert!(matches!(result, Err(ApiError::NotFound("pdf"))));
    }

    #[tokio::test]
    async fn test_get_pdf_with_corrupt_pages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<pdfs::Model, Vec<_>, _>(vec![vec![stored(2, "1,,2")]])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let result = get_pdf(State(state), Path(2)).await;
        assert!(matches!(result, Err(ApiError::InternalServerError)));
    }

    #[tokio::test]
    async fn test_list_pdfs() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<pdfs::Model, Vec<_>, _>(vec![vec![
                stored(2, "7"),
                stored(1, ""),
            ]])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let response = list_pdfs(State(state)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_pdf() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let state = test_app_state(Some(Arc::new(db)));

        let response = delete_pdf(State(state.clone()), Extension(admin()), Path(1))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let result = delete_pdf(State(state), Extension(admin()), Path(1)).await;
        assert!(matches!(result, Err(ApiError::NotFound("pdf"))));
    }
}
