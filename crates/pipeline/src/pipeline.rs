//! Runs the migration stages against one store.

use std::path::PathBuf;

use coolforum_core::config::MigrationConfig;
use sqlx::PgPool;

use crate::config::DataFiles;
use crate::error::MigrateResult;
use crate::housekeeping::run_housekeeping;
use crate::importers::{
    import_categories, import_posts, import_private_messages, import_threads, import_users,
};
use crate::reconcile::{reconcile_conversations, reconcile_threads};
use crate::report::MigrationReport;
use crate::sequences::reset_sequences;
use crate::stage::{Stage, StageTracker};

/// A migration run over one set of export files.
pub struct Pipeline {
    pool: PgPool,
    files: DataFiles,
    credentials_path: PathBuf,
    config: MigrationConfig,
    tracker: StageTracker,
    report: MigrationReport,
}

impl Pipeline {
    pub fn new(
        pool: PgPool,
        files: DataFiles,
        credentials_path: PathBuf,
        config: MigrationConfig,
    ) -> Self {
        Self {
            pool,
            files,
            credentials_path,
            config,
            tracker: StageTracker::default(),
            report: MigrationReport::default(),
        }
    }

    /// Run every stage in order and return the report.
    pub async fn run(mut self) -> MigrateResult<MigrationReport> {
        for stage in Stage::ORDER {
            self.run_stage(stage).await?;
        }
        Ok(self.report)
    }

    /// Run a single stage. Fails if a prerequisite has not completed.
    pub async fn run_stage(&mut self, stage: Stage) -> MigrateResult<()> {
        self.tracker.begin(stage)?;
        tracing::info!(%stage, "Stage started");

        let pool = &self.pool;
        let config = &self.config;
        let report = &mut self.report;
        match stage {
            Stage::Categories => {
                report.categories = import_categories(pool, &self.files.categories).await?;
            }
            Stage::Users => {
                report.users =
                    import_users(pool, &self.files.users, &self.credentials_path, config).await?;
            }
            Stage::Threads => {
                report.threads = import_threads(pool, &self.files.threads, config).await?;
            }
            Stage::Posts => {
                let (counts, per_category) = import_posts(pool, &self.files.posts, config).await?;
                report.posts = counts;
                report.posts_per_category = per_category;
            }
            Stage::ThreadReconcile => {
                let outcome = reconcile_threads(pool, config).await?;
                report.threads_reconciled = outcome.threads_updated;
                report.contributors_added = outcome.contributors_added;
            }
            Stage::PrivateMessages => {
                let (counts, conversations) =
                    import_private_messages(pool, &self.files.private_messages, config).await?;
                report.messages = counts;
                report.conversations_created = conversations;
            }
            Stage::ConversationReconcile => {
                report.conversations_reconciled = reconcile_conversations(pool).await?;
            }
            Stage::Housekeeping => {
                let outcome = run_housekeeping(pool, config).await?;
                report.users_deleted = outcome.deleted;
                report.users_deactivated = outcome.deactivated;
                report.conversations_deleted = outcome.conversations_deleted;
            }
            Stage::SequenceReset => {
                report.next_ids = reset_sequences(pool).await?;
            }
        }

        self.tracker.complete(stage);
        tracing::info!(%stage, "Stage completed");
        Ok(())
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }
}
