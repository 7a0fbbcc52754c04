//! Thread model.

use coolforum_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `threads` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Thread {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub author_id: DbId,
    pub category_id: DbId,
    pub icon: String,
    pub is_sticky: bool,
    pub is_locked: bool,
    pub is_removed: bool,
    pub view_count: i32,
    pub modified: Timestamp,
    #[serde(skip_serializing)]
    pub cession_token: String,
}

/// DTO for inserting a migrated thread with an explicit primary key.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub id: DbId,
    pub category_id: DbId,
    pub title: String,
    pub author_id: DbId,
    pub icon: String,
    pub view_count: i32,
    pub is_sticky: bool,
    pub cession_token: String,
}

/// The columns slug reconciliation reads.
#[derive(Debug, Clone, FromRow)]
pub struct ThreadSlugRow {
    pub id: DbId,
    pub category_id: DbId,
    pub title: String,
    pub slug: String,
}

/// Recomputed derived state for one thread. `modified: None` keeps the
/// stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadDerivedUpdate {
    pub id: DbId,
    pub slug: String,
    pub modified: Option<Timestamp>,
}
