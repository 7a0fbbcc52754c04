use std::collections::BTreeMap;

use coolforum_db::repositories::{SequenceRepo, SerialTable};
use sqlx::PgPool;

use crate::error::MigrateResult;

/// Move every bypassed sequence past its table's largest id.
///
/// Returns the next id each sequence will hand out, keyed by table name.
pub async fn reset_sequences(pool: &PgPool) -> MigrateResult<BTreeMap<String, i64>> {
    let mut next_ids = BTreeMap::new();
    for table in SerialTable::ALL {
        let next = SequenceRepo::reset_to_max(pool, table).await?;
        tracing::info!(%table, next_id = next, "Sequence reset");
        next_ids.insert(table.table_name().to_string(), next);
    }
    Ok(next_ids)
}
