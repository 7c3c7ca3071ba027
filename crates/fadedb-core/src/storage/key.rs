//! Row key encoding.
//!
//! Rows are keyed by `[table bytes][0x00][row id (16 bytes)]`. The null
//! separator keeps table prefixes unambiguous, so a prefix scan over
//! `table\0` yields exactly that table's rows.

/// Size of a row ID in bytes (UUID).
pub const ROW_ID_SIZE: usize = 16;

/// Encode the storage key for a row.
pub fn row_key(table: &str, row_id: &[u8; ROW_ID_SIZE]) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1 + ROW_ID_SIZE);
    key.extend_from_slice(table.as_bytes());
    key.push(0);
    key.extend_from_slice(row_id);
    key
}

/// The prefix for scanning all rows of a table.
pub fn table_prefix(table: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(table.len() + 1);
    prefix.extend_from_slice(table.as_bytes());
    prefix.push(0);
    prefix
}

/// Extract the row ID from a full key, given the table it was scanned under.
pub fn row_id_from_key(key: &[u8], table: &str) -> Option<[u8; ROW_ID_SIZE]> {
    let prefix_len = table.len() + 1;
    if key.len() != prefix_len + ROW_ID_SIZE {
        return None;
    }

    let mut row_id = [0u8; ROW_ID_SIZE];
    row_id.copy_from_slice(&key[prefix_len..]);
    Some(row_id)
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_micros() as u64
}
