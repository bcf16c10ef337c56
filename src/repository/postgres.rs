//! PostgreSQL book store

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::{not_found, BookStore};
use crate::{
    config::{DatabaseBackend, DatabaseConfig},
    error::AppResult,
    models::{Author, Book, SchemaProfile},
};

const CREATE_AUTHORS: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
"#;

const CREATE_BOOKS_BASIC: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES authors (id)
    )
"#;

const CREATE_BOOKS_PUBLISHED: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        published INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES authors (id)
    )
"#;

#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
    schema: SchemaProfile,
}

impl PostgresStore {
    pub fn new(pool: Pool<Postgres>, schema: SchemaProfile) -> Self {
        Self { pool, schema }
    }

    pub async fn connect(config: &DatabaseConfig, schema: SchemaProfile) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
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

#[async_trait]
impl BookStore for PostgresStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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
            let author = sqlx::query_as::<_, Author>(
                "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
            )
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
            authors.push(author);
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
        let query = format!("SELECT {} FROM books WHERE id = $1", self.columns());
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn create_book(&self, book: &Book) -> AppResult<Book> {
        let id: i32 = match self.schema {
            SchemaProfile::Basic => {
                sqlx::query_scalar(
                    "INSERT INTO books (title, author_id) VALUES ($1, $2) RETURNING id",
                )
                .bind(&book.title)
                .bind(book.author_id)
                .fetch_one(&self.pool)
                .await?
            }
            SchemaProfile::Published => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO books (title, author_id, published)
                    VALUES ($1, $2, $3)
                    RETURNING id
                    "#,
                )
                .bind(&book.title)
                .bind(book.author_id)
                .bind(book.published.unwrap_or(0))
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(Book { id, ..book.clone() })
    }

    async fn update_book(&self, id: i32, book: &Book) -> AppResult<u64> {
        let result = match self.schema {
            SchemaProfile::Basic => {
                sqlx::query("UPDATE books SET title = $1, author_id = $2 WHERE id = $3")
                    .bind(&book.title)
                    .bind(book.author_id)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            SchemaProfile::Published => {
                sqlx::query(
                    "UPDATE books SET title = $1, author_id = $2, published = $3 WHERE id = $4",
                )
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
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
