use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    codec::PageListCodec,
    models::{pdfs, users, NewPdf, NewUser, PdfRecord, UserRecord, UserUpdate},
};

use super::error::RepositoryError;

/// Print job persistence. Every read and write of the page list goes through
/// the codec the store was built with.
#[derive(Clone)]
pub struct PdfStore {
    db: Arc<DatabaseConnection>,
    codec: PageListCodec,
}

impl PdfStore {
    pub fn new(db: Arc<DatabaseConnection>, codec: PageListCodec) -> Self {
        Self { db, codec }
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    fn to_record(&self, model: pdfs::Model) -> Result<PdfRecord, RepositoryError> {
        let id = model.id;
        PdfRecord::from_model(model, self.codec.as_ref()).map_err(|e| {
            tracing::error!("stored page list of pdf {id} is unreadable: {e}");
            RepositoryError::Format(e)
        })
    }

    pub async fn insert_one(&self, pdf: NewPdf) -> Result<PdfRecord, RepositoryError> {
        pdf.validate()?;
        let model = pdf.into_active_model(self.codec.as_ref())?;
        let inserted = model
            .insert(self.db.as_ref())
            .await
            .map_err(RepositoryError::StoreError)?;
        tracing::debug!("stored pdf {} ({})", inserted.id, inserted.file_path);
        self.to_record(inserted)
    }

    pub async fn find_one_by(&self, id: i32) -> Result<Option<PdfRecord>, RepositoryError> {
        pdfs::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?
            .map(|model| self.to_record(model))
            .transpose()
    }

    /// All print jobs, newest first.
    pub async fn find_all(&self) -> Result<Vec<PdfRecord>, RepositoryError> {
        pdfs::Entity::find()
            .order_by_desc(pdfs::Column::CreatedAt)
            .order_by_desc(pdfs::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?
            .into_iter()
            .map(|model| self.to_record(model))
            .collect()
    }

    /// Replaces the page list of an existing job. Returns `None` when the job
    /// does not exist.
    pub async fn update_pages(
        &self,
        id: i32,
        pages: Vec<u32>,
    ) -> Result<Option<PdfRecord>, RepositoryError> {
        let encoded = self.codec.encode(&pages)?;

        let Some(model) = pdfs::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?
        else {
            return Ok(None);
        };

        let mut active: pdfs::ActiveModel = model.into();
        active.pages = Set(encoded);
        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(RepositoryError::UpdateError)?;
        self.to_record(updated).map(Some)
    }

    pub async fn delete_by(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = pdfs::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(RepositoryError::DeleteError)?;
        Ok(result.rows_affected > 0)
    }
}

#[derive(Clone)]
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn insert_one(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        user.validate()?;
        let model: users::ActiveModel = user.into();
        let inserted = model
            .insert(self.db.as_ref())
            .await
            .map_err(RepositoryError::StoreError)?;
        Ok(inserted.into())
    }

    pub async fn find_one_by(&self, id: i32) -> Result<Option<UserRecord>, RepositoryError> {
        let user = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?;
        Ok(user.map(Into::into))
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?;
        Ok(user.map(Into::into))
    }

    pub async fn find_all(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Applies an administrative edit. Returns `None` when the user does not
    /// exist.
    pub async fn update_one(
        &self,
        id: i32,
        update: UserUpdate,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::FetchError)?
        else {
            return Ok(None);
        };

        if update.is_empty() {
            return Ok(Some(model.into()));
        }

        let mut active: users::ActiveModel = model.into();
        update.apply(&mut active)?;
        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(RepositoryError::UpdateError)?;
        Ok(Some(updated.into()))
    }

    /// Creates the user unless one with the same username already exists.
    ///
    /// Returns the stored user and whether it was created by this call. An
    /// existing user is returned untouched.
    pub async fn ensure_superuser(
        &self,
        user: NewUser,
    ) -> Result<(UserRecord, bool), RepositoryError> {
        if let Some(existing) = self.find_by_username(&user.username).await? {
            tracing::info!("user {} already exists, skipping", existing.username);
            return Ok((existing, false));
        }

        self.insert_superuser(user).await
    }

    /// Inserts the user as an administrator. When the username was taken in
    /// the meantime the stored user is returned instead.
    pub(crate) async fn insert_superuser(
        &self,
        user: NewUser,
    ) -> Result<(UserRecord, bool), RepositoryError> {
        let username = user.username.clone();
        match self.insert_one(user.admin()).await {
            Ok(created) => {
                tracing::info!("created superuser {}", created.username);
                Ok((created, true))
            }
            Err(RepositoryError::StoreError(e))
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                let existing = self
                    .find_by_username(&username)
                    .await?
                    .ok_or(RepositoryError::StoreError(e))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }
}
