//! Serial sequence maintenance.
//!
//! Rows inserted with explicit ids do not advance their `BIGSERIAL`
//! sequence. After a migration each sequence must be moved past the largest
//! id present, or the forum's next ordinary insert collides.

use sqlx::PgPool;

/// Tables whose `id` sequence the migration bypasses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialTable {
    ForumUsers,
    Categories,
    Threads,
    Posts,
}

impl SerialTable {
    pub const ALL: [SerialTable; 4] = [
        SerialTable::ForumUsers,
        SerialTable::Categories,
        SerialTable::Threads,
        SerialTable::Posts,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Self::ForumUsers => "forum_users",
            Self::Categories => "categories",
            Self::Threads => "threads",
            Self::Posts => "posts",
        }
    }
}

impl std::fmt::Display for SerialTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Provides sequence reset and inspection.
pub struct SequenceRepo;

impl SequenceRepo {
    /// Restart the table's id sequence at `max(id) + 1` (1 when empty).
    ///
    /// Returns the id the next default insert will receive.
    pub async fn reset_to_max(pool: &PgPool, table: SerialTable) -> Result<i64, sqlx::Error> {
        let name = table.table_name();
        let query = format!(
            "SELECT setval(pg_get_serial_sequence('{name}', 'id'), \
                           COALESCE(MAX(id), 0) + 1, false) \
             FROM {name}"
        );
        sqlx::query_scalar(&query).fetch_one(pool).await
    }

    /// Largest id currently stored in the table, if any.
    pub async fn max_id(pool: &PgPool, table: SerialTable) -> Result<Option<i64>, sqlx::Error> {
        let query = format!("SELECT MAX(id) FROM {}", table.table_name());
        sqlx::query_scalar(&query).fetch_one(pool).await
    }
}
