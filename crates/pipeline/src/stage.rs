//! Fixed stage order of a migration run.
//!
//! Each stage names the stages that must have completed before it. The
//! [`StageTracker`] enforces this so a caller cannot, say, import posts
//! before threads exist.

use serde::Serialize;

use crate::error::{MigrateError, MigrateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Categories,
    Users,
    Threads,
    Posts,
    ThreadReconcile,
    PrivateMessages,
    ConversationReconcile,
    Housekeeping,
    SequenceReset,
}

impl Stage {
    /// Execution order of a full run.
    pub const ORDER: [Stage; 9] = [
        Stage::Categories,
        Stage::Users,
        Stage::Threads,
        Stage::Posts,
        Stage::ThreadReconcile,
        Stage::PrivateMessages,
        Stage::ConversationReconcile,
        Stage::Housekeeping,
        Stage::SequenceReset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Users => "users",
            Self::Threads => "threads",
            Self::Posts => "posts",
            Self::ThreadReconcile => "thread_reconcile",
            Self::PrivateMessages => "private_messages",
            Self::ConversationReconcile => "conversation_reconcile",
            Self::Housekeeping => "housekeeping",
            Self::SequenceReset => "sequence_reset",
        }
    }

    /// Stages that must be complete before this one may start.
    pub fn prerequisites(&self) -> &'static [Stage] {
        match self {
            Self::Categories | Self::Users => &[],
            Self::Threads => &[Stage::Categories, Stage::Users],
            Self::Posts => &[Stage::Users, Stage::Threads],
            Self::ThreadReconcile => &[Stage::Posts],
            Self::PrivateMessages => &[Stage::Users],
            Self::ConversationReconcile => &[Stage::PrivateMessages],
            Self::Housekeeping => &[Stage::ThreadReconcile, Stage::ConversationReconcile],
            Self::SequenceReset => &[Stage::Housekeeping],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records completed stages and rejects out-of-order starts.
#[derive(Debug, Default)]
pub struct StageTracker {
    completed: Vec<Stage>,
}

impl StageTracker {
    pub fn is_complete(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Check that `stage` may start now.
    pub fn begin(&self, stage: Stage) -> MigrateResult<()> {
        if self.is_complete(stage) {
            return Err(MigrateError::StageRepeated(stage));
        }
        match stage
            .prerequisites()
            .iter()
            .find(|p| !self.is_complete(**p))
        {
            Some(missing) => Err(MigrateError::StageOrder {
                stage,
                missing: *missing,
            }),
            None => Ok(()),
        }
    }

    pub fn complete(&mut self, stage: Stage) {
        if !self.is_complete(stage) {
            self.completed.push(stage);
        }
    }

    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }
}
