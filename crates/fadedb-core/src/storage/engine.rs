//! Storage engine implementation.

use super::key::{self, ROW_ID_SIZE};
use super::{RowRecord, StorageConfig};
use crate::error::Error;
use sled::{Db, Tree};

/// Tree name for row data.
const ROWS_TREE: &str = "rows";

/// Tree name for engine metadata.
const META_TREE: &str = "meta";

/// The main storage engine wrapping sled.
///
/// Rows are stored in a single tree keyed by table and row ID, so a table
/// scan is a prefix scan. The meta tree holds engine-level entries such as
/// the applied schema.
pub struct StorageEngine {
    /// The underlying sled database.
    db: Db,

    /// Tree for row data.
    rows_tree: Tree,

    /// Tree for metadata.
    meta_tree: Tree,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let sled_config = config.to_sled_config();
        let db = sled_config.open()?;
        let rows_tree = db.open_tree(ROWS_TREE)?;
        let meta_tree = db.open_tree(META_TREE)?;

        Ok(Self {
            db,
            rows_tree,
            meta_tree,
        })
    }

    /// Check if the database was recovered from a previous crash.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Write a row, replacing any existing row with the same key.
    pub fn put_row(
        &self,
        table: &str,
        row_id: &[u8; ROW_ID_SIZE],
        record: &RowRecord,
    ) -> Result<(), Error> {
        let key = key::row_key(table, row_id);
        let value = record.to_bytes()?;
        self.rows_tree.insert(key, value)?;
        Ok(())
    }

    /// Get a row by table and ID.
    pub fn get_row(
        &self,
        table: &str,
        row_id: &[u8; ROW_ID_SIZE],
    ) -> Result<Option<RowRecord>, Error> {
        let key = key::row_key(table, row_id);
        match self.rows_tree.get(key)? {
            Some(bytes) => Ok(Some(RowRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Physically remove a row. Removing a missing row is a no-op.
    pub fn remove_row(&self, table: &str, row_id: &[u8; ROW_ID_SIZE]) -> Result<(), Error> {
        let key = key::row_key(table, row_id);
        self.rows_tree.remove(key)?;
        Ok(())
    }

    /// Scan all rows of a table in key order.
    pub fn scan_table<'a>(
        &'a self,
        table: &str,
    ) -> impl Iterator<Item = Result<([u8; ROW_ID_SIZE], RowRecord), Error>> + 'a {
        let prefix = key::table_prefix(table);
        let table = table.to_string();

        self.rows_tree.scan_prefix(prefix).map(move |result| {
            let (key_bytes, value_bytes) = result?;
            let row_id = key::row_id_from_key(&key_bytes, &table).ok_or(Error::InvalidKey)?;
            let record = RowRecord::from_bytes(&value_bytes)?;
            Ok((row_id, record))
        })
    }

    /// Count the rows of a table.
    pub fn count_table(&self, table: &str) -> Result<usize, Error> {
        let mut count = 0;
        for result in self.rows_tree.scan_prefix(key::table_prefix(table)) {
            result?;
            count += 1;
        }
        Ok(count)
    }

    /// Store an engine metadata entry.
    pub fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.meta_tree.insert(key, value)?;
        Ok(())
    }

    /// Read an engine metadata entry.
    pub fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.meta_tree.get(key)?.map(|v| v.to_vec()))
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Get database size in bytes.
    pub fn size_on_disk(&self) -> Result<u64, Error> {
        Ok(self.db.size_on_disk()?)
    }

    /// Generate a new row ID (UUID v4 bytes).
    pub fn generate_id() -> [u8; ROW_ID_SIZE] {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        // Counter to ensure uniqueness even with same timestamp
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_nanos() as u64;

        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut id = [0u8; 16];
        id[..8].copy_from_slice(&now.to_le_bytes());
        id[8..16].copy_from_slice(&counter.to_le_bytes());

        // Set UUID version 4 bits
        id[6] = (id[6] & 0x0f) | 0x40;
        id[8] = (id[8] & 0x3f) | 0x80;

        id
    }

    /// Get access to the rows tree (for batch commits).
    pub(crate) fn rows_tree(&self) -> &Tree {
        &self.rows_tree
    }

    /// Get the underlying sled database.
    pub fn db(&self) -> &Db {
        &self.db
    }
}
