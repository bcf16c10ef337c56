//! Repository layer for database operations

pub mod postgres;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{DatabaseBackend, DatabaseConfig},
    error::{AppError, AppResult},
    models::{Author, Book, SchemaProfile},
};

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Storage interface over the `authors` and `books` tables.
///
/// Each operation is a single auto-committed statement against the
/// backend's connection pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    fn backend(&self) -> DatabaseBackend;

    fn schema(&self) -> SchemaProfile;

    /// Create `authors` and `books` if they do not exist yet
    async fn ensure_schema(&self) -> AppResult<()>;

    /// Round-trip to the store
    async fn ping(&self) -> AppResult<()>;

    /// Insert the given authors, only when no author exists yet
    async fn seed_authors(&self, names: &[String]) -> AppResult<Vec<Author>>;

    /// All books in store-native order
    async fn list_books(&self) -> AppResult<Vec<Book>>;

    async fn get_book(&self, id: i32) -> AppResult<Book>;

    /// Insert a book and return it with its assigned id
    async fn create_book(&self, book: &Book) -> AppResult<Book>;

    /// Replace title, author and publication of a book. Returns rows affected.
    async fn update_book(&self, id: i32, book: &Book) -> AppResult<u64>;

    /// Returns rows affected
    async fn delete_book(&self, id: i32) -> AppResult<u64>;
}

/// Connect to the configured store
pub async fn connect(config: &DatabaseConfig) -> AppResult<Arc<dyn BookStore>> {
    let backend = config
        .backend()
        .map_err(|e| AppError::Internal(format!("Invalid database configuration: {}", e)))?;
    let schema = config
        .schema()
        .map_err(|e| AppError::Internal(format!("Invalid database configuration: {}", e)))?;

    let store: Arc<dyn BookStore> = match backend {
        DatabaseBackend::Postgres => Arc::new(PostgresStore::connect(config, schema).await?),
        DatabaseBackend::Sqlite => Arc::new(SqliteStore::connect(config, schema).await?),
    };

    tracing::info!(
        "Connected to {:?} store ({:?} schema)",
        store.backend(),
        store.schema()
    );
    Ok(store)
}

pub(crate) fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}
