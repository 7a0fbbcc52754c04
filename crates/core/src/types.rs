/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Convert legacy unix epoch seconds into a [`Timestamp`].
///
/// Returns `None` when the value falls outside chrono's representable range.
pub fn timestamp_from_epoch(secs: i64) -> Option<Timestamp> {
    chrono::DateTime::from_timestamp(secs, 0)
}
