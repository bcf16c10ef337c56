//! SQLite book store

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use super::{not_found, BookStore};
use crate::{
    config::{DatabaseBackend, DatabaseConfig},
    error::{AppError, AppResult},
    models::{Author, Book, SchemaProfile},
};

const CREATE_AUTHORS: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
"#;

const CREATE_BOOKS_BASIC: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES authors (id)
    )
"#;

const CREATE_BOOKS_PUBLISHED: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        published INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES authors (id)
    )
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    schema: SchemaProfile,
}

impl SqliteStore {
    pub fn new(pool: Pool<Sqlite>, schema: SchemaProfile) -> Self {
        Self { pool, schema }
    }

    /// Open (creating if needed) the database file with foreign keys enforced
    pub async fn connect(config: &DatabaseConfig, schema: SchemaProfile) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool, schema))
    }

    fn columns(&self) -> &'static str {
        if self.schema.has_published() {
            "id, title, author_id, published"
        } else {
            "id, title, author_id"
        }
    }
}

fn row_id(rowid: i64) -> AppResult<i32> {
    i32::try_from(rowid).map_err(|_| AppError::Internal(format!("Row id {} out of range", rowid)))
}

#[async_trait]
impl BookStore for SqliteStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn schema(&self) -> SchemaProfile {
        self.schema
    }

    async fn ensure_schema(&self) -> AppResult<()> {
        let create_books = match self.schema {
            SchemaProfile::Basic => CREATE_BOOKS_BASIC,
            SchemaProfile::Published => CREATE_BOOKS_PUBLISHED,
        };

        sqlx::query(CREATE_AUTHORS).execute(&self.pool).await?;
        sqlx::query(create_books).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn seed_authors(&self, names: &[String]) -> AppResult<Vec<Author>> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(Vec::new());
        }

        let mut authors = Vec::with_capacity(names.len());
        for name in names {
            let result = sqlx::query("INSERT INTO authors (name) VALUES (?)")
                .bind(name)
                .execute(&self.pool)
                .await?;
            authors.push(Author {
                id: row_id(result.last_insert_rowid())?,
                name: name.clone(),
            });
        }
        Ok(authors)
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books", self.columns());
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = ?", self.columns());
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn create_book(&self, book: &Book) -> AppResult<Book> {
        let result = match self.schema {
            SchemaProfile::Basic => {
                sqlx::query("INSERT INTO books (title, author_id) VALUES (?, ?)")
                    .bind(&book.title)
                    .bind(book.author_id)
                    .execute(&self.pool)
                    .await?
            }
            SchemaProfile::Published => {
                sqlx::query("INSERT INTO books (title, author_id, published) VALUES (?, ?, ?)")
                    .bind(&book.title)
                    .bind(book.author_id)
                    .bind(book.published.unwrap_or(0))
                    .execute(&self.pool)
                    .await?
            }
        };

        let id = row_id(result.last_insert_rowid())?;
        tracing::debug!("Inserted book id={}", id);
        Ok(Book { id, ..book.clone() })
    }

    async fn update_book(&self, id: i32, book: &Book) -> AppResult<u64> {
        let result = match self.schema {
            SchemaProfile::Basic => {
                sqlx::query("UPDATE books SET title = ?, author_id = ? WHERE id = ?")
                    .bind(&book.title)
                    .bind(book.author_id)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            SchemaProfile::Published => {
                sqlx::query("UPDATE books SET title = ?, author_id = ?, published = ? WHERE id = ?")
                    .bind(&book.title)
                    .bind(book.author_id)
                    .bind(book.published.unwrap_or(0))
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }

    async fn delete_book(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
