//! Database utility functions.

use sqlx::types::chrono::Utc;

/// Generate a random UUID for ticket and organization rows.
pub fn generate_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Get current datetime as an RFC 3339 string with millisecond precision.
///
/// Millisecond precision keeps `updated_at` moving between writes that land
/// in the same second.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
