use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] DbErr),
    #[error("failed to apply migrations: {0}")]
    Migration(#[source] DbErr),
    #[error("no page list codec named {name:?} (available: {available})")]
    UnknownCodec { name: String, available: String },
}
