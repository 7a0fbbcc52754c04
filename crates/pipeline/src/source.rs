//! Reading legacy export files into validated records.

use std::path::Path;

use coolforum_core::json_repair::repair_export;
use coolforum_core::legacy::{decode_records, LegacyRecord};

use crate::error::{MigrateError, MigrateResult};

async fn read_export(path: &Path) -> MigrateResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}

/// Load a well-formed JSON export.
pub async fn load_plain<T: LegacyRecord>(path: &Path) -> MigrateResult<Vec<T>> {
    let text = read_export(path).await?;
    Ok(decode_records(&text)?)
}

/// Load a phpMyAdmin export, repairing it first.
pub async fn load_repaired<T: LegacyRecord>(path: &Path) -> MigrateResult<Vec<T>> {
    let raw = read_export(path).await?;
    tracing::debug!(file = %path.display(), bytes = raw.len(), "Repairing export");
    let fixed = repair_export(&raw)?;
    let records = decode_records(&fixed)?;
    tracing::debug!(file = %path.display(), records = records.len(), "Export decoded");
    Ok(records)
}
