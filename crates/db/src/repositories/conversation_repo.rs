//! Repository for the `conversations` and `conversation_participants` tables.

use coolforum_core::types::DbId;
use sqlx::PgPool;

use crate::models::conversation::Conversation;

/// Provides the conversation operations the migration needs.
pub struct ConversationRepo;

impl ConversationRepo {
    /// `(conversation_id, user_id)` membership rows for all conversations.
    pub async fn list_memberships(pool: &PgPool) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT conversation_id, user_id FROM conversation_participants
             ORDER BY conversation_id, user_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Create a conversation and attach its participants atomically.
    pub async fn create_with_participants(
        pool: &PgPool,
        participants: &[DbId],
    ) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar("INSERT INTO conversations DEFAULT VALUES RETURNING id")
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id, user_id)
             SELECT $1, user_id FROM UNNEST($2::bigint[]) AS p(user_id)",
        )
        .bind(id)
        .bind(participants)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>("SELECT id, modified FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set every conversation's `modified` to its latest message time.
    ///
    /// Conversations without messages keep their current value.
    pub async fn refresh_modified(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE conversations c SET modified = m.latest
             FROM (SELECT conversation_id, MAX(created) AS latest
                   FROM messages GROUP BY conversation_id) m
             WHERE c.id = m.conversation_id",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete conversations with fewer than two participants left, which
    /// happens when a participant's account is deleted. Their messages
    /// cascade.
    pub async fn delete_underpopulated(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM conversations c
             WHERE (SELECT COUNT(*) FROM conversation_participants p
                    WHERE p.conversation_id = c.id) < 2",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Total number of conversations.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(pool)
            .await
    }
}
