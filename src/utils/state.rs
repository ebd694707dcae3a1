use std::sync::Arc;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::ExposeSecret;

use crate::{
    codec::CodecRegistry,
    config::Config,
    database::{Migrator, PdfStore, UserStore},
};

use super::errors::Error;

#[derive(Clone)]
pub struct AppState {
    pub pdf_repo: Arc<PdfStore>,
    pub user_repo: Arc<UserStore>,
}

impl AppState {
    /// Wires the stores over an open connection, resolving the page list
    /// codec named in the configuration.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        codecs: &CodecRegistry,
    ) -> Result<Self, Error> {
        let name = &config.storage.pages_codec;
        let codec = codecs.page_list(name).ok_or_else(|| Error::UnknownCodec {
            name: name.clone(),
            available: codecs.names().join(", "),
        })?;
        tracing::debug!("using page list codec {}", codec.name());

        Ok(Self {
            pdf_repo: Arc::new(PdfStore::new(Arc::clone(&db), codec)),
            user_repo: Arc::new(UserStore::new(db)),
        })
    }
}

pub async fn connect(config: &Config) -> Result<DatabaseConnection, Error> {
    Database::connect(config.database.url.expose_secret())
        .await
        .map_err(Error::Connect)
}

pub async fn migrate(db: &DatabaseConnection) -> Result<(), Error> {
    Migrator::up(db, None).await.map_err(Error::Migration)
}

/// Names of migrations not yet applied.
pub async fn pending_migrations(db: &DatabaseConnection) -> Result<Vec<String>, Error> {
    let pending = Migrator::get_pending_migrations(db)
        .await
        .map_err(Error::Migration)?;
    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}

/// Connects, migrates and builds the server state.
pub async fn setup(config: &Config) -> Result<AppState, Error> {
    let db = connect(config).await?;
    migrate(&db).await?;
    AppState::new(Arc::new(db), config, &CodecRegistry::default())
}
