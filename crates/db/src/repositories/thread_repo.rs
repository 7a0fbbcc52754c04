//! Repository for the `threads` and `thread_contributors` tables.

use coolforum_core::types::DbId;
use sqlx::PgPool;

use crate::models::thread::{NewThread, Thread, ThreadDerivedUpdate, ThreadSlugRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, title, author_id, category_id, icon, is_sticky, is_locked, \
                        is_removed, view_count, modified, cession_token";

/// Provides the thread operations the migration needs.
pub struct ThreadRepo;

impl ThreadRepo {
    /// `(thread_id, category_id)` for every thread.
    pub async fn list_category_ids(pool: &PgPool) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as("SELECT id, category_id FROM threads ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Every cession token already issued.
    pub async fn list_cession_tokens(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT cession_token FROM threads")
            .fetch_all(pool)
            .await
    }

    /// Find a thread by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Thread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM threads WHERE id = $1");
        sqlx::query_as::<_, Thread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert threads with their explicit ids. Returns the number of rows written.
    ///
    /// Slugs start empty; reconciliation fills them once posts are in.
    pub async fn bulk_create(pool: &PgPool, rows: &[NewThread]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let categories: Vec<DbId> = rows.iter().map(|r| r.category_id).collect();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        let authors: Vec<DbId> = rows.iter().map(|r| r.author_id).collect();
        let icons: Vec<&str> = rows.iter().map(|r| r.icon.as_str()).collect();
        let views: Vec<i32> = rows.iter().map(|r| r.view_count).collect();
        let sticky: Vec<bool> = rows.iter().map(|r| r.is_sticky).collect();
        let tokens: Vec<&str> = rows.iter().map(|r| r.cession_token.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO threads \
                (id, category_id, title, author_id, icon, view_count, is_sticky, cession_token) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], $4::bigint[], \
                                  $5::text[], $6::int[], $7::bool[], $8::text[])",
        )
        .bind(&ids)
        .bind(&categories)
        .bind(&titles)
        .bind(&authors)
        .bind(&icons)
        .bind(&views)
        .bind(&sticky)
        .bind(&tokens)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Id, category, title and current slug of every thread, ordered by id.
    pub async fn list_slug_rows(pool: &PgPool) -> Result<Vec<ThreadSlugRow>, sqlx::Error> {
        sqlx::query_as::<_, ThreadSlugRow>(
            "SELECT id, category_id, title, slug FROM threads ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Write recomputed slugs and modification times in one statement.
    pub async fn bulk_update_derived(
        pool: &PgPool,
        updates: &[ThreadDerivedUpdate],
    ) -> Result<u64, sqlx::Error> {
        if updates.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = updates.iter().map(|u| u.id).collect();
        let slugs: Vec<&str> = updates.iter().map(|u| u.slug.as_str()).collect();
        let modified: Vec<_> = updates.iter().map(|u| u.modified).collect();

        let result = sqlx::query(
            "UPDATE threads t SET
                slug = v.slug,
                modified = COALESCE(v.modified, t.modified)
             FROM UNNEST($1::bigint[], $2::text[], $3::timestamptz[]) AS v(id, slug, modified)
             WHERE t.id = v.id",
        )
        .bind(&ids)
        .bind(&slugs)
        .bind(&modified)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Register every distinct post author as a contributor of the post's
    /// thread. Existing contributor rows are left alone.
    pub async fn add_contributors_from_posts(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO thread_contributors (thread_id, user_id)
             SELECT DISTINCT thread_id, author_id FROM posts
             ON CONFLICT DO NOTHING",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Contributor ids of one thread, ascending.
    pub async fn list_contributors(pool: &PgPool, thread_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM thread_contributors WHERE thread_id = $1 ORDER BY user_id",
        )
        .bind(thread_id)
        .fetch_all(pool)
        .await
    }
}
