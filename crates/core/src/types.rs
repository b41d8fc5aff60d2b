use chrono::SubsecRound;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Sub-second digits kept by `TIMESTAMPTZ`.
pub const STORED_SUBSEC_DIGITS: u16 = 6;

/// Truncate to the microsecond precision Postgres stores, so a value
/// compares equal to its persisted row.
pub fn to_stored_precision(ts: Timestamp) -> Timestamp {
    ts.trunc_subsecs(STORED_SUBSEC_DIGITS)
}
