use std::collections::{HashMap, HashSet};
use std::path::Path;

use coolforum_core::config::MigrationConfig;
use coolforum_core::error::CoreError;
use coolforum_core::keygen::unique_tokens;
use coolforum_core::legacy::LegacyThread;
use coolforum_core::text::convert_title;
use coolforum_core::types::DbId;
use coolforum_db::models::thread::NewThread;
use coolforum_db::repositories::{CategoryRepo, ForumUserRepo, ThreadRepo};
use rand::Rng;
use sqlx::PgPool;

use crate::error::MigrateResult;
use crate::report::ImportCounts;
use crate::source::load_repaired;

/// Keys already present in the store that thread rows are checked against.
#[derive(Debug, Default)]
pub struct ThreadContext {
    /// Existing thread id -> category id.
    pub threads: HashMap<DbId, DbId>,
    pub users: HashSet<DbId>,
    pub categories: HashSet<DbId>,
    pub tokens: HashSet<String>,
}

impl ThreadContext {
    pub async fn load(pool: &PgPool) -> MigrateResult<Self> {
        Ok(Self {
            threads: ThreadRepo::list_category_ids(pool).await?.into_iter().collect(),
            users: ForumUserRepo::list_ids(pool).await?.into_iter().collect(),
            categories: CategoryRepo::list_ids(pool).await?.into_iter().collect(),
            tokens: ThreadRepo::list_cession_tokens(pool).await?.into_iter().collect(),
        })
    }
}

#[derive(Debug, Default)]
pub struct ThreadBatch {
    pub rows: Vec<NewThread>,
    pub counts: ImportCounts,
}

/// Build rows for every thread whose pk is not yet known.
///
/// Cession tokens are drawn from `rng` for the new threads only and handed
/// out in ascending order following file order.
pub fn prepare_threads<R: Rng + ?Sized>(
    records: Vec<LegacyThread>,
    ctx: &ThreadContext,
    config: &MigrationConfig,
    rng: &mut R,
) -> MigrateResult<ThreadBatch> {
    let mut batch = ThreadBatch::default();
    let mut seen: HashSet<DbId> = ctx.threads.keys().copied().collect();
    let mut fresh = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.id) {
            fresh.push(record);
        } else {
            batch.counts.skipped += 1;
        }
    }

    let tokens = unique_tokens(rng, fresh.len(), config.key_length, &ctx.tokens);

    for (record, token) in fresh.into_iter().zip(tokens) {
        let category_id = config.category_map.resolve(record.forum_id)?;
        if !ctx.categories.contains(&category_id) {
            return Err(CoreError::NotFound {
                entity: "category",
                id: category_id,
            }
            .into());
        }
        if !ctx.users.contains(&record.author_id) {
            config
                .policies
                .thread_author
                .on_missing("user", record.author_id)?;
            tracing::debug!(
                thread_id = record.id,
                author_id = record.author_id,
                "Dropping thread without author"
            );
            batch.counts.dropped += 1;
            continue;
        }
        let view_count = i32::try_from(record.view_count).map_err(|_| {
            CoreError::Validation(format!(
                "thread {} view count {} out of range",
                record.id, record.view_count
            ))
        })?;

        batch.rows.push(NewThread {
            id: record.id,
            category_id,
            title: convert_title(&record.subject, config.thread_title_max_length),
            author_id: record.author_id,
            icon: format!("{}.gif", record.icon),
            view_count,
            is_sticky: record.sticky,
            cession_token: token,
        });
    }
    Ok(batch)
}

/// Import the topic export at `path`.
pub async fn import_threads(
    pool: &PgPool,
    path: &Path,
    config: &MigrationConfig,
) -> MigrateResult<ImportCounts> {
    let records: Vec<LegacyThread> = load_repaired(path).await?;
    let ctx = ThreadContext::load(pool).await?;

    let total = records.len();
    let mut batch = prepare_threads(records, &ctx, config, &mut rand::rng())?;
    batch.counts.created = ThreadRepo::bulk_create(pool, &batch.rows).await?;

    tracing::info!(
        total,
        created = batch.counts.created,
        skipped = batch.counts.skipped,
        dropped = batch.counts.dropped,
        "Threads imported"
    );
    Ok(batch.counts)
}
