//! Identity types for CASELENS entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tenant identifier. Minted by the external system of record, so it is
/// carried as an opaque string rather than a UUID.
pub type TenantId = String;

/// Case identifier, also foreign-minted and opaque.
pub type CaseId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 query id (timestamp-sortable).
pub fn new_query_id() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_query_id_is_v7() {
        let id = new_query_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_query_ids_are_sortable() {
        let id1 = new_query_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = new_query_id();
        // UUIDv7 should be lexicographically sortable by time
        assert!(id1.to_string() < id2.to_string());
    }
}
