use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbBackend, MockDatabase};
use sea_orm_migration::MigratorTrait;

use crate::{
    codec::{CodecRegistry, CommaPageListCodec},
    database::{Migrator, PdfStore, UserStore},
    utils::state::AppState,
};

/// Server state over a mock connection. Without a connection every query
/// fails, which is enough for paths that never reach the database.
pub fn test_app_state(db_conn: Option<Arc<DatabaseConnection>>) -> AppState {
    let db = db_conn
        .unwrap_or_else(|| Arc::new(MockDatabase::new(DbBackend::Postgres).into_connection()));

    let codec = CodecRegistry::default()
        .page_list(CommaPageListCodec::NAME)
        .expect("comma codec is built in");

    AppState {
        pdf_repo: Arc::new(PdfStore::new(db.clone(), codec)),
        user_repo: Arc::new(UserStore::new(db)),
    }
}

/// A migrated in-memory SQLite database, for paths that depend on real
/// constraint errors.
pub async fn sqlite_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would open its own empty database
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite is available");
    Migrator::up(&db, None)
        .await
        .expect("migrations apply on sqlite");
    Arc::new(db)
}
