//! Repository for the `forum_users` table.

use coolforum_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{ForumUser, NewForumUser, UserActivityRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, date_joined, logo, quote, \
                        website, is_active";

/// Provides the user operations the migration needs.
pub struct ForumUserRepo;

impl ForumUserRepo {
    /// All user primary keys.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM forum_users ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// All usernames currently taken.
    pub async fn list_usernames(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT username FROM forum_users")
            .fetch_all(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ForumUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forum_users WHERE id = $1");
        sqlx::query_as::<_, ForumUser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert users with their explicit ids. Returns the number of rows written.
    pub async fn bulk_create(pool: &PgPool, rows: &[NewForumUser]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let usernames: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        let emails: Vec<&str> = rows.iter().map(|r| r.email.as_str()).collect();
        let hashes: Vec<&str> = rows.iter().map(|r| r.password_hash.as_str()).collect();
        let joined: Vec<_> = rows.iter().map(|r| r.date_joined).collect();
        let logos: Vec<&str> = rows.iter().map(|r| r.logo.as_str()).collect();
        let quotes: Vec<&str> = rows.iter().map(|r| r.quote.as_str()).collect();
        let websites: Vec<&str> = rows.iter().map(|r| r.website.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO forum_users \
                (id, username, email, password_hash, date_joined, logo, quote, website) \
             SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::text[], \
                                  $5::timestamptz[], $6::text[], $7::text[], $8::text[])",
        )
        .bind(&ids)
        .bind(&usernames)
        .bind(&emails)
        .bind(&hashes)
        .bind(&joined)
        .bind(&logos)
        .bind(&quotes)
        .bind(&websites)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Post count and latest post time for every user, ordered by id.
    pub async fn list_activity(pool: &PgPool) -> Result<Vec<UserActivityRow>, sqlx::Error> {
        sqlx::query_as::<_, UserActivityRow>(
            "SELECT u.id AS user_id, COUNT(p.id) AS post_count, MAX(p.created) AS latest_post
             FROM forum_users u
             LEFT JOIN posts p ON p.author_id = u.id
             GROUP BY u.id
             ORDER BY u.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Hard-delete users. Owned rows go with them through `ON DELETE CASCADE`.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM forum_users WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set `is_active = false` on the given users.
    pub async fn deactivate_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("UPDATE forum_users SET is_active = false WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
