//! Bookshelf Book Catalog Server
//!
//! A REST JSON API exposing create, read, update and delete operations
//! over a book catalog stored in PostgreSQL or SQLite.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
