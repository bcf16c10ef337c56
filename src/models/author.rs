//! Author model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Author record. Authors are only referenced by books and are never
/// managed through the HTTP interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub name: String,
}
