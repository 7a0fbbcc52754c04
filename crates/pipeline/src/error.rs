use std::path::PathBuf;

use coolforum_core::error::CoreError;

use crate::stage::Stage;

/// Error type for a migration run. Any variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A domain-level error from `coolforum_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the forum schema failed.
    #[error("Schema migration error: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Stage {stage} cannot run before {missing} has completed")]
    StageOrder { stage: Stage, missing: Stage },

    #[error("Stage {0} has already completed")]
    StageRepeated(Stage),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for pipeline results.
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
