//! Side file of generated credentials.
//!
//! Each run appends one JSON object mapping new usernames to their one-time
//! plaintext passwords, followed by a newline. The file is for handing out
//! credentials by hand; nothing reads it back.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{MigrateError, MigrateResult};

/// Append `credentials` to the side file at `path`, creating it if needed.
pub async fn append_credentials(
    path: &Path,
    credentials: &BTreeMap<String, String>,
) -> MigrateResult<()> {
    let mut line = serde_json::to_string(credentials)
        .map_err(coolforum_core::error::CoreError::from)?;
    line.push('\n');
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| MigrateError::io(path, e))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| MigrateError::io(path, e))?;
    file.flush().await.map_err(|e| MigrateError::io(path, e))?;
    Ok(())
}
