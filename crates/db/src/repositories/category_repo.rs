//! Repository for the `categories` table.

use coolforum_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, NewCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, title, subtitle, post_count";

/// Provides read and bulk-insert operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// All category primary keys.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM categories ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Find a category by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert categories with their explicit ids. Returns the number of rows written.
    pub async fn bulk_create(pool: &PgPool, rows: &[NewCategory]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let slugs: Vec<&str> = rows.iter().map(|r| r.slug.as_str()).collect();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        let subtitles: Vec<&str> = rows.iter().map(|r| r.subtitle.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO categories (id, slug, title, subtitle) \
             SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::text[], $4::text[])",
        )
        .bind(&ids)
        .bind(&slugs)
        .bind(&titles)
        .bind(&subtitles)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
