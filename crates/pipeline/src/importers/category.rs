use std::collections::HashSet;
use std::path::Path;

use coolforum_core::legacy::LegacyCategory;
use coolforum_core::types::DbId;
use coolforum_db::models::category::NewCategory;
use coolforum_db::repositories::CategoryRepo;
use sqlx::PgPool;

use crate::error::MigrateResult;
use crate::report::ImportCounts;
use crate::source::load_plain;

/// Rows to insert plus the per-record outcome.
#[derive(Debug, Default)]
pub struct CategoryBatch {
    pub rows: Vec<NewCategory>,
    pub counts: ImportCounts,
}

/// Keep every category whose pk is not in `existing`.
pub fn prepare_categories(records: Vec<LegacyCategory>, existing: &HashSet<DbId>) -> CategoryBatch {
    let mut seen = existing.clone();
    let mut batch = CategoryBatch::default();
    for record in records {
        if !seen.insert(record.id) {
            batch.counts.skipped += 1;
            continue;
        }
        batch.rows.push(NewCategory {
            id: record.id,
            slug: record.slug,
            title: record.title,
            subtitle: record.subtitle,
        });
    }
    batch
}

/// Import the category fixture at `path`.
pub async fn import_categories(pool: &PgPool, path: &Path) -> MigrateResult<ImportCounts> {
    let records: Vec<LegacyCategory> = load_plain(path).await?;
    let existing: HashSet<DbId> = CategoryRepo::list_ids(pool).await?.into_iter().collect();

    let total = records.len();
    let mut batch = prepare_categories(records, &existing);
    batch.counts.created = CategoryRepo::bulk_create(pool, &batch.rows).await?;

    tracing::info!(
        total,
        created = batch.counts.created,
        skipped = batch.counts.skipped,
        "Categories imported"
    );
    Ok(batch.counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: DbId, slug: &str) -> LegacyCategory {
        LegacyCategory {
            id,
            title: slug.to_uppercase(),
            subtitle: String::new(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn existing_and_repeated_pks_are_skipped() {
        let existing = HashSet::from([1]);
        let batch = prepare_categories(
            vec![category(1, "a"), category(2, "b"), category(2, "b-again")],
            &existing,
        );
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].slug, "b");
        assert_eq!(batch.counts.skipped, 2);
    }
}
