//! Post model.

use coolforum_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: DbId,
    pub thread_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub modified: Option<Timestamp>,
    pub content_plain: String,
    pub markup: String,
}

/// DTO for inserting a migrated post with an explicit primary key.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: DbId,
    pub thread_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub content_plain: String,
}
