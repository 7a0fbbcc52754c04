//! Immutable settings shared by every migration stage.
//!
//! Nothing here reads the environment; the pipeline crate builds a
//! [`MigrationConfig`] once and hands a reference to each importer.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a forum username.
pub const USERNAME_MAX_LENGTH: usize = 30;

/// Maximum length of a thread title.
pub const THREAD_TITLE_MAX_LENGTH: usize = 80;

/// Maximum length of a thread slug.
pub const SLUG_MAX_LENGTH: usize = 50;

/// Title slugified when a thread title reduces to an empty slug.
pub const DEFAULT_FALLBACK_TITLE: &str = "untitled";

/// Offset applied to legacy `[size=N]` markup.
pub const DEFAULT_SIZE_SHIFT: u32 = 9;

/// Length of generated cession tokens and one-time passwords.
pub const DEFAULT_KEY_LENGTH: usize = 20;

/// Legacy forum id -> target category id. Only 5, 6 and 7 move.
pub const LEGACY_CATEGORY_MAP: &[(DbId, DbId)] =
    &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 6), (6, 7), (7, 5)];

// ---------------------------------------------------------------------------
// Missing parent policy
// ---------------------------------------------------------------------------

/// What an importer does when a record references a parent row that does
/// not exist in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingParentPolicy {
    /// Drop the record without reporting an error.
    SkipOnMissingParent,
    /// Abort the run with [`CoreError::NotFound`].
    FailOnMissingParent,
}

impl MissingParentPolicy {
    /// Apply the policy to a missing `entity` with id `id`.
    ///
    /// Returns `Ok(())` when the caller should skip the record.
    pub fn on_missing(self, entity: &'static str, id: DbId) -> Result<(), CoreError> {
        match self {
            Self::SkipOnMissingParent => Ok(()),
            Self::FailOnMissingParent => Err(CoreError::NotFound { entity, id }),
        }
    }
}

/// Missing-parent policy per relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentPolicies {
    pub thread_author: MissingParentPolicy,
    pub post_thread: MissingParentPolicy,
    pub post_author: MissingParentPolicy,
    pub message_participant: MissingParentPolicy,
}

impl Default for ParentPolicies {
    fn default() -> Self {
        Self {
            thread_author: MissingParentPolicy::FailOnMissingParent,
            post_thread: MissingParentPolicy::SkipOnMissingParent,
            post_author: MissingParentPolicy::FailOnMissingParent,
            message_participant: MissingParentPolicy::FailOnMissingParent,
        }
    }
}

// ---------------------------------------------------------------------------
// Category map
// ---------------------------------------------------------------------------

/// Static translation of legacy forum ids to target category ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    entries: BTreeMap<DbId, DbId>,
}

impl CategoryMap {
    pub fn new(pairs: &[(DbId, DbId)]) -> Self {
        Self {
            entries: pairs.iter().copied().collect(),
        }
    }

    /// Resolve a legacy forum id. Unmapped ids are a fatal input error.
    pub fn resolve(&self, legacy_id: DbId) -> Result<DbId, CoreError> {
        self.entries
            .get(&legacy_id)
            .copied()
            .ok_or(CoreError::UnmappedCategory(legacy_id))
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new(LEGACY_CATEGORY_MAP)
    }
}

// ---------------------------------------------------------------------------
// Migration config
// ---------------------------------------------------------------------------

/// Domain settings for one migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub category_map: CategoryMap,
    /// Users whose latest post predates this instant are deactivated.
    pub inactivity_cutoff: Timestamp,
    pub username_max_length: usize,
    pub thread_title_max_length: usize,
    pub slug_max_length: usize,
    pub fallback_title: String,
    pub size_shift: u32,
    pub key_length: usize,
    pub policies: ParentPolicies,
}

impl MigrationConfig {
    /// The cutoff used by the legacy dataset: 2010-01-01 00:00 UTC.
    pub fn default_cutoff() -> Timestamp {
        let midnight = NaiveDate::from_ymd_opt(2010, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Utc.from_utc_datetime(&midnight)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            category_map: CategoryMap::default(),
            inactivity_cutoff: Self::default_cutoff(),
            username_max_length: USERNAME_MAX_LENGTH,
            thread_title_max_length: THREAD_TITLE_MAX_LENGTH,
            slug_max_length: SLUG_MAX_LENGTH,
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            size_shift: DEFAULT_SIZE_SHIFT,
            key_length: DEFAULT_KEY_LENGTH,
            policies: ParentPolicies::default(),
        }
    }
}
