//! Books service

use std::sync::Arc;

use crate::{error::AppResult, models::Book, repository::BookStore};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.store.get_book(id).await
    }

    /// Create a book; any id in the payload is ignored
    pub async fn create(&self, data: Book) -> AppResult<Book> {
        let book = self.store.schema().normalize(data);
        self.store.create_book(&book).await
    }

    /// Replace a book and echo the submitted payload.
    ///
    /// The returned `id` is the one from the payload, not `id`.
    pub async fn update(&self, id: i32, data: Book) -> AppResult<Book> {
        let book = self.store.schema().normalize(data);
        let affected = self.store.update_book(id, &book).await?;
        if affected == 0 {
            tracing::debug!("Update of book {} matched no row", id);
        }
        Ok(book)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let affected = self.store.delete_book(id).await?;
        if affected == 0 {
            tracing::debug!("Delete of book {} matched no row", id);
        }
        Ok(())
    }

    /// Check store connectivity (for readiness)
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
