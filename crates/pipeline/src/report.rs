//! Counters collected during a run.

use std::collections::BTreeMap;

use coolforum_core::types::DbId;
use serde::Serialize;

/// Outcome of one importer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    /// Rows inserted.
    pub created: u64,
    /// Records whose primary key (or fingerprint) was already present.
    pub skipped: u64,
    /// Records discarded for a missing parent or a self-addressed message.
    pub dropped: u64,
}

/// Summary of a whole migration run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MigrationReport {
    pub categories: ImportCounts,
    pub users: ImportCounts,
    pub threads: ImportCounts,
    pub posts: ImportCounts,
    pub messages: ImportCounts,
    pub conversations_created: u64,
    /// Legacy posts per target category; informational only.
    pub posts_per_category: BTreeMap<DbId, u64>,
    pub threads_reconciled: u64,
    pub contributors_added: u64,
    pub conversations_reconciled: u64,
    pub users_deleted: u64,
    pub users_deactivated: u64,
    /// Conversations removed because a participant was deleted.
    pub conversations_deleted: u64,
    /// Next id handed out by each reset sequence.
    pub next_ids: BTreeMap<String, i64>,
}
