use std::path::{Path, PathBuf};

use coolforum_core::config::MigrationConfig;

use crate::error::{MigrateError, MigrateResult};

/// Default directory holding the legacy exports.
pub const DEFAULT_DATA_DIR: &str = "util/data";

/// Default side file receiving generated credentials.
pub const DEFAULT_NEW_USERS_FILE: &str = "new_users.json";

/// Default connection pool size; the run is sequential.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Paths of the five legacy export files.
#[derive(Debug, Clone)]
pub struct DataFiles {
    pub categories: PathBuf,
    pub users: PathBuf,
    pub threads: PathBuf,
    pub posts: PathBuf,
    pub private_messages: PathBuf,
}

impl DataFiles {
    /// The fixed export file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            categories: dir.join("categories.json"),
            users: dir.join("CF_user.json"),
            threads: dir.join("CF_topics.json"),
            posts: dir.join("CF_posts.json"),
            private_messages: dir.join("CF_privatemsg.json"),
        }
    }
}

/// Runtime configuration of the migration binary.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub files: DataFiles,
    pub new_users_file: PathBuf,
    pub migration: MigrationConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default             |
    /// |----------------------------|---------------------|
    /// | `DATABASE_URL`             | required            |
    /// | `MIGRATION_DATA_DIR`       | `util/data`         |
    /// | `NEW_USERS_FILE`           | `new_users.json`    |
    /// | `DATABASE_MAX_CONNECTIONS` | `5`                 |
    pub fn from_env() -> MigrateResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| MigrateError::Config("DATABASE_URL must be set".into()))?;

        let data_dir: PathBuf = std::env::var("MIGRATION_DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.into())
            .into();

        let new_users_file: PathBuf = std::env::var("NEW_USERS_FILE")
            .unwrap_or_else(|_| DEFAULT_NEW_USERS_FILE.into())
            .into();

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                MigrateError::Config("DATABASE_MAX_CONNECTIONS must be a valid u32".into())
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
            files: DataFiles::in_dir(&data_dir),
            new_users_file,
            migration: MigrationConfig::default(),
        })
    }
}
