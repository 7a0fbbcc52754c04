//! Repository for the `posts` table.

use coolforum_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::post::{NewPost, Post};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, thread_id, author_id, created, modified, content_plain, markup";

/// Provides the post operations the migration needs.
pub struct PostRepo;

impl PostRepo {
    /// All post primary keys.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM posts ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert posts with their explicit ids. Returns the number of rows written.
    pub async fn bulk_create(pool: &PgPool, rows: &[NewPost]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let threads: Vec<DbId> = rows.iter().map(|r| r.thread_id).collect();
        let authors: Vec<DbId> = rows.iter().map(|r| r.author_id).collect();
        let created: Vec<Timestamp> = rows.iter().map(|r| r.created).collect();
        let contents: Vec<&str> = rows.iter().map(|r| r.content_plain.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO posts (id, thread_id, author_id, created, content_plain) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::bigint[], \
                                  $4::timestamptz[], $5::text[])",
        )
        .bind(&ids)
        .bind(&threads)
        .bind(&authors)
        .bind(&created)
        .bind(&contents)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// `(thread_id, latest created)` for every thread that has posts.
    pub async fn latest_per_thread(pool: &PgPool) -> Result<Vec<(DbId, Timestamp)>, sqlx::Error> {
        sqlx::query_as("SELECT thread_id, MAX(created) FROM posts GROUP BY thread_id")
            .fetch_all(pool)
            .await
    }

    /// Total number of posts.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await
    }
}
