/// Surrogate keys are PostgreSQL BIGSERIAL columns.
pub type DbId = i64;

/// All timestamps in the composer are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
