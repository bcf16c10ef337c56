//! Data models for Bookshelf

pub mod author;
pub mod book;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, SchemaProfile};
