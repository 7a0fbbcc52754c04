use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use coolforum_core::config::MigrationConfig;
use coolforum_core::error::CoreError;
use coolforum_core::keygen::keygen;
use coolforum_core::legacy::LegacyUser;
use coolforum_core::password::hash_password;
use coolforum_core::text::{convert_username, unescape_html};
use coolforum_core::types::DbId;
use coolforum_db::models::user::NewForumUser;
use coolforum_db::repositories::ForumUserRepo;
use sqlx::PgPool;

use crate::credentials::append_credentials;
use crate::error::{MigrateError, MigrateResult};
use crate::report::ImportCounts;
use crate::source::load_repaired;

/// Prepared user rows and the plaintext passwords issued for them.
#[derive(Debug, Default)]
pub struct UserBatch {
    pub rows: Vec<NewForumUser>,
    /// Username -> one-time plaintext password, sorted by username.
    pub credentials: BTreeMap<String, String>,
    pub counts: ImportCounts,
}

/// Build rows for every user whose pk is absent from `existing_ids`.
///
/// A normalised username that is already taken (in the store or earlier in
/// the batch) is a [`CoreError::Conflict`].
pub fn prepare_users(
    records: Vec<LegacyUser>,
    existing_ids: &HashSet<DbId>,
    taken_usernames: &HashSet<String>,
    config: &MigrationConfig,
) -> MigrateResult<UserBatch> {
    let mut ids = existing_ids.clone();
    let mut usernames = taken_usernames.clone();
    let mut batch = UserBatch::default();

    for (i, record) in records.into_iter().enumerate() {
        if !ids.insert(record.id) {
            batch.counts.skipped += 1;
            continue;
        }

        let username = convert_username(&record.login, config.username_max_length);
        if !usernames.insert(username.clone()) {
            return Err(CoreError::Conflict(format!(
                "user {} normalises to username '{username}' which is already taken",
                record.id
            ))
            .into());
        }

        let password = keygen(config.key_length);
        let password_hash =
            hash_password(&password).map_err(|e| MigrateError::PasswordHash(e.to_string()))?;
        tracing::debug!(index = i, user_id = record.id, %username, "Prepared user");

        batch.rows.push(NewForumUser {
            id: record.id,
            username: username.clone(),
            email: unescape_html(&record.email),
            password_hash,
            date_joined: record.registered,
            logo: format!("logo/{}", record.logo),
            quote: unescape_html(&record.quote),
            website: unescape_html(&record.website),
        });
        batch.credentials.insert(username, password);
    }
    Ok(batch)
}

/// Import the user export at `path` and append the issued credentials to
/// `credentials_path`.
pub async fn import_users(
    pool: &PgPool,
    path: &Path,
    credentials_path: &Path,
    config: &MigrationConfig,
) -> MigrateResult<ImportCounts> {
    let records: Vec<LegacyUser> = load_repaired(path).await?;
    let existing_ids: HashSet<DbId> = ForumUserRepo::list_ids(pool).await?.into_iter().collect();
    let taken: HashSet<String> = ForumUserRepo::list_usernames(pool)
        .await?
        .into_iter()
        .collect();

    let total = records.len();
    let mut batch = prepare_users(records, &existing_ids, &taken, config)?;
    batch.counts.created = ForumUserRepo::bulk_create(pool, &batch.rows).await?;

    append_credentials(credentials_path, &batch.credentials).await?;

    tracing::info!(
        total,
        created = batch.counts.created,
        skipped = batch.counts.skipped,
        credentials_file = %credentials_path.display(),
        "Users imported"
    );
    Ok(batch.counts)
}
