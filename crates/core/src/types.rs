/// Integer primary key type used by all entities.
pub type DbId = i64;

/// UTC timestamp used by all entities; serialized as ISO-8601.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
