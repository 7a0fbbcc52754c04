//! Post-import account cleanup.

use coolforum_core::config::MigrationConfig;
use coolforum_core::housekeeping::{classify, plan, HousekeepingPlan, UserActivity};
use coolforum_core::types::Timestamp;
use coolforum_db::repositories::{ConversationRepo, ForumUserRepo};
use sqlx::PgPool;

use crate::error::MigrateResult;

#[derive(Debug, Default, Clone, Copy)]
pub struct HousekeepingOutcome {
    pub deleted: u64,
    pub deactivated: u64,
    /// Conversations left with fewer than two participants.
    pub conversations_deleted: u64,
}

async fn current_plan(pool: &PgPool, cutoff: Timestamp) -> MigrateResult<HousekeepingPlan> {
    let activity: Vec<UserActivity> = ForumUserRepo::list_activity(pool)
        .await?
        .into_iter()
        .map(UserActivity::from)
        .collect();
    for user in &activity {
        tracing::debug!(
            user_id = user.user_id,
            posts = user.post_count,
            action = %classify(user, cutoff),
            "Housekeeping decision"
        );
    }
    Ok(plan(&activity, cutoff))
}

/// Delete users without posts, then deactivate users whose latest post
/// predates the cutoff.
///
/// Deleting a user cascades to the threads they authored and to the posts
/// of others in those threads, so deletion repeats until no user is left
/// without posts. Conversations that lost a participant are removed with
/// their messages.
pub async fn run_housekeeping(
    pool: &PgPool,
    config: &MigrationConfig,
) -> MigrateResult<HousekeepingOutcome> {
    let cutoff = config.inactivity_cutoff;
    let mut outcome = HousekeepingOutcome::default();

    let mut pass = 0;
    let final_plan = loop {
        let current = current_plan(pool, cutoff).await?;
        if current.delete.is_empty() {
            break current;
        }
        pass += 1;
        let deleted = ForumUserRepo::delete_many(pool, &current.delete).await?;
        tracing::info!(pass, deleted, "Users without posts deleted");
        outcome.deleted += deleted;
    };

    outcome.conversations_deleted = ConversationRepo::delete_underpopulated(pool).await?;
    tracing::info!(
        deleted = outcome.conversations_deleted,
        "Orphaned conversations removed"
    );

    outcome.deactivated = ForumUserRepo::deactivate_many(pool, &final_plan.deactivate).await?;
    tracing::info!(
        deactivated = outcome.deactivated,
        cutoff = %cutoff,
        "Inactive users deactivated"
    );

    Ok(outcome)
}
