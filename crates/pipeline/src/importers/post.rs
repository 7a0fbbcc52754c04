use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use coolforum_core::config::MigrationConfig;
use coolforum_core::legacy::LegacyPost;
use coolforum_core::text::clean_content;
use coolforum_core::types::DbId;
use coolforum_db::models::post::NewPost;
use coolforum_db::repositories::{CategoryRepo, ForumUserRepo, PostRepo, ThreadRepo};
use sqlx::PgPool;

use crate::error::MigrateResult;
use crate::report::ImportCounts;
use crate::source::load_repaired;

/// Keys already present in the store that post rows are checked against.
#[derive(Debug, Default)]
pub struct PostContext {
    /// Known thread id -> category id.
    pub threads: HashMap<DbId, DbId>,
    pub posts: HashSet<DbId>,
    pub users: HashSet<DbId>,
    pub categories: Vec<DbId>,
}

impl PostContext {
    pub async fn load(pool: &PgPool) -> MigrateResult<Self> {
        Ok(Self {
            threads: ThreadRepo::list_category_ids(pool).await?.into_iter().collect(),
            posts: PostRepo::list_ids(pool).await?.into_iter().collect(),
            users: ForumUserRepo::list_ids(pool).await?.into_iter().collect(),
            categories: CategoryRepo::list_ids(pool).await?,
        })
    }
}

#[derive(Debug, Default)]
pub struct PostBatch {
    pub rows: Vec<NewPost>,
    pub counts: ImportCounts,
    /// Posts per category among records whose thread is known.
    pub per_category: BTreeMap<DbId, u64>,
}

/// Build rows for every post whose pk is new and whose thread is known.
pub fn prepare_posts(
    records: Vec<LegacyPost>,
    ctx: &PostContext,
    config: &MigrationConfig,
) -> MigrateResult<PostBatch> {
    let mut batch = PostBatch {
        per_category: ctx.categories.iter().map(|id| (*id, 0)).collect(),
        ..Default::default()
    };
    let mut seen = ctx.posts.clone();

    for record in records {
        let Some(category_id) = ctx.threads.get(&record.thread_id) else {
            config
                .policies
                .post_thread
                .on_missing("thread", record.thread_id)?;
            batch.counts.dropped += 1;
            continue;
        };
        *batch.per_category.entry(*category_id).or_default() += 1;

        if !seen.insert(record.id) {
            batch.counts.skipped += 1;
            continue;
        }
        if !ctx.users.contains(&record.author_id) {
            config
                .policies
                .post_author
                .on_missing("user", record.author_id)?;
            batch.counts.dropped += 1;
            continue;
        }

        batch.rows.push(NewPost {
            id: record.id,
            thread_id: record.thread_id,
            author_id: record.author_id,
            created: record.created,
            content_plain: clean_content(&record.body, config.size_shift),
        });
    }
    Ok(batch)
}

/// Import the post export at `path`.
///
/// Returns the counts and the per-category tally, which is only reported.
pub async fn import_posts(
    pool: &PgPool,
    path: &Path,
    config: &MigrationConfig,
) -> MigrateResult<(ImportCounts, BTreeMap<DbId, u64>)> {
    let records: Vec<LegacyPost> = load_repaired(path).await?;
    let ctx = PostContext::load(pool).await?;

    let total = records.len();
    let mut batch = prepare_posts(records, &ctx, config)?;
    batch.counts.created = PostRepo::bulk_create(pool, &batch.rows).await?;

    for (category_id, count) in &batch.per_category {
        tracing::info!(category_id, posts = count, "Category post tally");
    }
    tracing::info!(
        total,
        created = batch.counts.created,
        skipped = batch.counts.skipped,
        dropped = batch.counts.dropped,
        "Posts imported"
    );
    Ok((batch.counts, batch.per_category))
}
