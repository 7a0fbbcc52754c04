//! Recompute state that depends on rows inserted later in the run.
//!
//! Threads get their contributor set, slug and `modified` time from their
//! posts; conversations get `modified` from their latest message. Nothing
//! here deletes rows, and running it twice leaves the store unchanged.

use std::collections::HashMap;

use coolforum_core::config::MigrationConfig;
use coolforum_core::slug::thread_slug;
use coolforum_core::types::{DbId, Timestamp};
use coolforum_db::models::thread::{ThreadDerivedUpdate, ThreadSlugRow};
use coolforum_db::repositories::{ConversationRepo, PostRepo, ThreadRepo};
use sqlx::PgPool;

use crate::error::MigrateResult;

/// Slugs in use, scoped per category.
#[derive(Debug, Default)]
pub struct SlugIndex {
    owners: HashMap<(DbId, String), DbId>,
}

impl SlugIndex {
    pub fn from_rows(rows: &[ThreadSlugRow]) -> Self {
        let owners = rows
            .iter()
            .filter(|r| !r.slug.is_empty())
            .map(|r| ((r.category_id, r.slug.clone()), r.id))
            .collect();
        Self { owners }
    }

    fn is_taken(&self, category_id: DbId, slug: &str) -> bool {
        self.owners.contains_key(&(category_id, slug.to_string()))
    }

    /// Free `slug` if `thread_id` holds it.
    fn release(&mut self, category_id: DbId, slug: &str, thread_id: DbId) {
        let key = (category_id, slug.to_string());
        if self.owners.get(&key) == Some(&thread_id) {
            self.owners.remove(&key);
        }
    }

    fn claim(&mut self, category_id: DbId, slug: String, thread_id: DbId) {
        self.owners.insert((category_id, slug), thread_id);
    }
}

/// Compute the slug and `modified` of every thread, in id order.
///
/// Each thread releases its current slug before a new one is chosen, so a
/// thread whose slug is already correct keeps it.
pub fn compute_thread_updates(
    rows: &[ThreadSlugRow],
    latest: &HashMap<DbId, Timestamp>,
    config: &MigrationConfig,
) -> Vec<ThreadDerivedUpdate> {
    let mut index = SlugIndex::from_rows(rows);
    rows.iter()
        .map(|row| {
            index.release(row.category_id, &row.slug, row.id);
            let slug = thread_slug(
                &row.title,
                &config.fallback_title,
                config.slug_max_length,
                |candidate| index.is_taken(row.category_id, candidate),
            );
            index.claim(row.category_id, slug.clone(), row.id);
            ThreadDerivedUpdate {
                id: row.id,
                slug,
                modified: latest.get(&row.id).copied(),
            }
        })
        .collect()
}

/// Counts reported by [`reconcile_threads`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadReconcileOutcome {
    pub threads_updated: u64,
    pub contributors_added: u64,
}

pub async fn reconcile_threads(
    pool: &PgPool,
    config: &MigrationConfig,
) -> MigrateResult<ThreadReconcileOutcome> {
    let contributors_added = ThreadRepo::add_contributors_from_posts(pool).await?;

    let rows = ThreadRepo::list_slug_rows(pool).await?;
    let latest: HashMap<DbId, Timestamp> =
        PostRepo::latest_per_thread(pool).await?.into_iter().collect();
    let without_posts = rows.iter().filter(|r| !latest.contains_key(&r.id)).count();

    let updates = compute_thread_updates(&rows, &latest, config);
    let threads_updated = ThreadRepo::bulk_update_derived(pool, &updates).await?;

    tracing::info!(
        threads = rows.len(),
        without_posts,
        contributors_added,
        "Threads reconciled"
    );
    Ok(ThreadReconcileOutcome {
        threads_updated,
        contributors_added,
    })
}

/// Set each conversation's `modified` to its latest message time.
pub async fn reconcile_conversations(pool: &PgPool) -> MigrateResult<u64> {
    let updated = ConversationRepo::refresh_modified(pool).await?;
    tracing::info!(updated, "Conversations reconciled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(id: DbId, category_id: DbId, title: &str, slug: &str) -> ThreadSlugRow {
        ThreadSlugRow {
            id,
            category_id,
            title: title.to_string(),
            slug: slug.to_string(),
        }
    }

    fn slugs(updates: &[ThreadDerivedUpdate]) -> Vec<&str> {
        updates.iter().map(|u| u.slug.as_str()).collect()
    }

    #[test]
    fn duplicate_titles_get_counters_within_a_category() {
        let rows = vec![
            row(1, 1, "Bonjour", ""),
            row(2, 1, "Bonjour", ""),
            row(3, 2, "Bonjour", ""),
        ];
        let updates = compute_thread_updates(&rows, &HashMap::new(), &MigrationConfig::default());
        assert_eq!(slugs(&updates), vec!["bonjour", "bonjour-1", "bonjour"]);
    }

    #[test]
    fn second_pass_is_stable() {
        let config = MigrationConfig::default();
        let rows = vec![row(1, 1, "Bonjour", ""), row(2, 1, "Bonjour", "")];
        let first = compute_thread_updates(&rows, &HashMap::new(), &config);

        let rows: Vec<ThreadSlugRow> = rows
            .iter()
            .zip(&first)
            .map(|(r, u)| row(r.id, r.category_id, &r.title, &u.slug))
            .collect();
        let second = compute_thread_updates(&rows, &HashMap::new(), &config);
        assert_eq!(slugs(&first), slugs(&second));
    }

    #[test]
    fn empty_title_falls_back() {
        let rows = vec![row(1, 1, "!!!", ""), row(2, 1, "", "")];
        let updates = compute_thread_updates(&rows, &HashMap::new(), &MigrationConfig::default());
        assert_eq!(slugs(&updates), vec!["untitled", "untitled-1"]);
    }

    #[test]
    fn modified_only_for_threads_with_posts() {
        let when = Utc.with_ymd_and_hms(2009, 9, 9, 0, 0, 0).unwrap();
        let rows = vec![row(1, 1, "A", ""), row(2, 1, "B", "")];
        let latest = HashMap::from([(1, when)]);
        let updates = compute_thread_updates(&rows, &latest, &MigrationConfig::default());
        assert_eq!(updates[0].modified, Some(when));
        assert_eq!(updates[1].modified, None);
    }
}
