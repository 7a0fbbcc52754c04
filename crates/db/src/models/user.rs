//! Forum user model.

use coolforum_core::housekeeping::UserActivity;
use coolforum_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `forum_users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ForumUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: Timestamp,
    pub logo: String,
    pub quote: String,
    pub website: String,
    pub is_active: bool,
}

/// DTO for inserting a migrated user with an explicit primary key.
#[derive(Debug, Clone)]
pub struct NewForumUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_joined: Timestamp,
    pub logo: String,
    pub quote: String,
    pub website: String,
}

/// Post count and latest post time of one user.
#[derive(Debug, Clone, FromRow)]
pub struct UserActivityRow {
    pub user_id: DbId,
    pub post_count: i64,
    pub latest_post: Option<Timestamp>,
}

impl From<UserActivityRow> for UserActivity {
    fn from(row: UserActivityRow) -> Self {
        Self {
            user_id: row.user_id,
            post_count: row.post_count,
            latest_post: row.latest_post,
        }
    }
}
