use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{FormatError, TextCodec};

/// A required field was absent or blank when building a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

// Print jobs
pub mod pdfs {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "pdfs")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub created_at: DateTimeUtc,
        pub file_path: String,
        /// Page list in its encoded form.
        #[sea_orm(column_type = "Text")]
        pub pages: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    #[async_trait::async_trait]
    impl ActiveModelBehavior for ActiveModel {
        async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
        where
            C: ConnectionTrait,
        {
            if insert {
                if self.created_at.is_not_set() {
                    self.created_at = Set(Utc::now());
                }
            } else {
                // The creation timestamp is never rewritten
                self.created_at = NotSet;
            }
            Ok(self)
        }
    }
}

// Authentication principals
pub mod users {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub username: String,
        pub email: String,
        pub password_hash: String,
        pub joined_at: DateTimeUtc,
        pub active: bool,
        pub is_admin: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    #[async_trait::async_trait]
    impl ActiveModelBehavior for ActiveModel {
        async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
        where
            C: ConnectionTrait,
        {
            if insert {
                if self.joined_at.is_not_set() {
                    self.joined_at = Set(Utc::now());
                }
                if self.active.is_not_set() {
                    self.active = Set(true);
                }
                if self.is_admin.is_not_set() {
                    self.is_admin = Set(false);
                }
            }
            Ok(self)
        }
    }
}

/// A submitted print job with its page list decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfRecord {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub file_path: String,
    pub pages: Vec<u32>,
}

impl PdfRecord {
    pub fn from_model(
        model: pdfs::Model,
        codec: &dyn TextCodec<Vec<u32>>,
    ) -> Result<Self, FormatError> {
        let pages = codec.decode(&model.pages)?;
        Ok(Self {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
            file_path: model.file_path,
            pages,
        })
    }
}

/// Fields accepted when a print job is submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPdf {
    pub title: String,
    pub file_path: String,
    pub pages: Vec<u32>,
}

impl NewPdf {
    pub fn new(title: impl Into<String>, file_path: impl Into<String>, pages: Vec<u32>) -> Self {
        Self {
            title: title.into(),
            file_path: file_path.into(),
            pages,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("file_path", &self.file_path)
    }

    /// Encodes the page list up front so that a bad value never reaches the
    /// database.
    pub fn into_active_model(
        self,
        codec: &dyn TextCodec<Vec<u32>>,
    ) -> Result<pdfs::ActiveModel, FormatError> {
        let pages = codec.encode(&self.pages)?;
        Ok(pdfs::ActiveModel {
            id: NotSet,
            title: Set(self.title),
            created_at: NotSet,
            file_path: Set(self.file_path),
            pages: Set(pages),
        })
    }
}

/// An authentication principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub joined_at: DateTime<Utc>,
    pub active: bool,
    pub is_admin: bool,
}

impl From<users::Model> for UserRecord {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            joined_at: model.joined_at,
            active: model.active,
            is_admin: model.is_admin,
        }
    }
}

/// Fields accepted when provisioning a user. The password must already be
/// hashed, see [`crate::auth::password::hash_password`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    pub is_admin: bool,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            active: true,
            is_admin: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password_hash)
    }
}

impl From<NewUser> for users::ActiveModel {
    fn from(user: NewUser) -> Self {
        Self {
            id: NotSet,
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            joined_at: NotSet,
            active: Set(user.active),
            is_admin: Set(user.is_admin),
        }
    }
}

/// Administrative edit of a user. `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.active.is_none()
            && self.is_admin.is_none()
    }

    pub(crate) fn apply(self, model: &mut users::ActiveModel) -> Result<(), ValidationError> {
        if let Some(email) = self.email {
            require("email", &email)?;
            model.email = Set(email);
        }
        if let Some(password_hash) = self.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(active) = self.active {
            model.active = Set(active);
        }
        if let Some(is_admin) = self.is_admin {
            model.is_admin = Set(is_admin);
        }
        Ok(())
    }
}
