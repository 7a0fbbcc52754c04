//! Post-import account cleanup rule.
//!
//! Deletion is decided before inactivity: a user without posts is removed
//! and therefore never considered for deactivation.

use crate::types::{DbId, Timestamp};

/// Posting activity of one user as seen after the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub user_id: DbId,
    pub post_count: i64,
    pub latest_post: Option<Timestamp>,
}

/// What housekeeping does with one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousekeepingAction {
    Delete,
    Deactivate,
    Keep,
}

impl HousekeepingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Deactivate => "deactivate",
            Self::Keep => "keep",
        }
    }
}

impl std::fmt::Display for HousekeepingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide the action for one user given the inactivity `cutoff`.
pub fn classify(activity: &UserActivity, cutoff: Timestamp) -> HousekeepingAction {
    match activity.latest_post {
        _ if activity.post_count == 0 => HousekeepingAction::Delete,
        None => HousekeepingAction::Delete,
        Some(latest) if latest < cutoff => HousekeepingAction::Deactivate,
        Some(_) => HousekeepingAction::Keep,
    }
}

/// User ids split by action.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HousekeepingPlan {
    pub delete: Vec<DbId>,
    pub deactivate: Vec<DbId>,
}

/// Classify every user and collect the ids to delete and to deactivate.
pub fn plan(activities: &[UserActivity], cutoff: Timestamp) -> HousekeepingPlan {
    let mut plan = HousekeepingPlan::default();
    for activity in activities {
        match classify(activity, cutoff) {
            HousekeepingAction::Delete => plan.delete.push(activity.user_id),
            HousekeepingAction::Deactivate => plan.deactivate.push(activity.user_id),
            HousekeepingAction::Keep => {}
        }
    }
    plan
}
