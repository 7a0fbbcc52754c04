//! Repository for the `messages` table.

use coolforum_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::conversation::{Message, MessageFingerprint, NewMessage};

/// Provides the message operations the migration needs.
pub struct MessageRepo;

impl MessageRepo {
    /// Fingerprints of every stored message.
    pub async fn list_fingerprints(pool: &PgPool) -> Result<Vec<MessageFingerprint>, sqlx::Error> {
        sqlx::query_as::<_, MessageFingerprint>(
            "SELECT conversation_id, author_id, created, content_plain FROM messages",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert messages. Returns the number of rows written.
    pub async fn bulk_create(pool: &PgPool, rows: &[NewMessage]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let conversations: Vec<DbId> = rows.iter().map(|r| r.conversation_id).collect();
        let authors: Vec<DbId> = rows.iter().map(|r| r.author_id).collect();
        let created: Vec<Timestamp> = rows.iter().map(|r| r.created).collect();
        let contents: Vec<&str> = rows.iter().map(|r| r.content_plain.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, author_id, created, content_plain) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::timestamptz[], $4::text[])",
        )
        .bind(&conversations)
        .bind(&authors)
        .bind(&created)
        .bind(&contents)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Messages of one conversation, oldest first.
    pub async fn list_by_conversation(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, author_id, created, content_plain FROM messages
             WHERE conversation_id = $1
             ORDER BY created, id",
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await
    }

    /// Total number of messages.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await
    }
}
