//! Category model.

use coolforum_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub post_count: i32,
}

/// DTO for inserting a category with an explicit primary key.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
}
