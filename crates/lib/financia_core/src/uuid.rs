// Helper for generating UUIDv7 (timestamp-sortable UUIDs).
//
// All Financia records get app-side UUIDv7 ids so listings can fall back on
// id order, and so the in-memory stores mint ids the same way as Postgres.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a textual record id, returning `None` for anything that is not a UUID.
pub fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}
