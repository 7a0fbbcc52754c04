//! Private conversation and message models.

use coolforum_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `conversations` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub id: DbId,
    pub modified: Timestamp,
}

/// A row from the `messages` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub content_plain: String,
}

/// DTO for inserting a message; ids come from the sequence.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub content_plain: String,
}

/// Identity of a message for duplicate detection across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow)]
pub struct MessageFingerprint {
    pub conversation_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub content_plain: String,
}

impl From<&NewMessage> for MessageFingerprint {
    fn from(m: &NewMessage) -> Self {
        Self {
            conversation_id: m.conversation_id,
            author_id: m.author_id,
            created: m.created,
            content_plain: m.content_plain.clone(),
        }
    }
}
