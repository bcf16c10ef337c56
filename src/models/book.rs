//! Book model and schema profiles

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book record, used both as request body and as response.
///
/// Absent request fields decode to zero values: a missing `author_id`
/// becomes 0 and is rejected by the foreign key on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Assigned by the store on creation; ignored on create
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub title: String,
    /// References `authors.id`
    #[serde(default)]
    pub author_id: i32,
    /// Publication year, only stored by the `published` schema profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub published: Option<i32>,
}

/// Layout of the `books` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProfile {
    /// `books(id, title, author_id)`
    Basic,
    /// `books(id, title, author_id, published)`
    Published,
}

impl SchemaProfile {
    pub fn has_published(self) -> bool {
        matches!(self, SchemaProfile::Published)
    }

    /// Shape a request payload to what this profile stores.
    pub fn normalize(self, mut book: Book) -> Book {
        book.published = match self {
            SchemaProfile::Basic => None,
            SchemaProfile::Published => Some(book.published.unwrap_or(0)),
        };
        book
    }
}
