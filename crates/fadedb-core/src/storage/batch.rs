//! Atomic multi-row write batches.

use super::key::{self, ROW_ID_SIZE};
use super::{RowRecord, StorageEngine};
use crate::error::Error;
use sled::transaction::ConflictableTransactionError;

/// A pending operation in a write batch.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Write a row, replacing any existing value.
    Put {
        /// Table name.
        table: String,
        /// Row ID.
        row_id: [u8; ROW_ID_SIZE],
        /// Row payload.
        record: RowRecord,
    },
    /// Physically remove a row.
    Remove {
        /// Table name.
        table: String,
        /// Row ID.
        row_id: [u8; ROW_ID_SIZE],
    },
}

/// A batch of row writes committed atomically.
///
/// Operations are collected and executed in a single sled transaction on
/// commit. All operations succeed or none do.
pub struct WriteBatch<'a> {
    engine: &'a StorageEngine,
    ops: Vec<BatchOp>,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(engine: &'a StorageEngine) -> Self {
        Self {
            engine,
            ops: Vec::new(),
        }
    }

    /// Queue a row write.
    pub fn put(
        &mut self,
        table: impl Into<String>,
        row_id: [u8; ROW_ID_SIZE],
        record: RowRecord,
    ) -> &mut Self {
        self.ops.push(BatchOp::Put {
            table: table.into(),
            row_id,
            record,
        });
        self
    }

    /// Queue a physical row removal.
    pub fn remove(&mut self, table: impl Into<String>, row_id: [u8; ROW_ID_SIZE]) -> &mut Self {
        self.ops.push(BatchOp::Remove {
            table: table.into(),
            row_id,
        });
        self
    }

    /// Get the pending operations.
    pub fn operations(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Get the number of pending operations.
    pub fn operation_count(&self) -> usize {
        self.ops.len()
    }

    /// Check whether the batch has no pending operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Commit the batch atomically.
    pub fn commit(self) -> Result<(), Error> {
        if self.ops.is_empty() {
            return Ok(());
        }

        let result: Result<(), sled::transaction::TransactionError<Error>> =
            self.engine.rows_tree().transaction(|tx| {
                for op in &self.ops {
                    match op {
                        BatchOp::Put {
                            table,
                            row_id,
                            record,
                        } => {
                            let key_bytes = key::row_key(table, row_id);
                            let value_bytes = record
                                .to_bytes()
                                .map_err(ConflictableTransactionError::Abort)?;
                            tx.insert(key_bytes, value_bytes)?;
                        }
                        BatchOp::Remove { table, row_id } => {
                            let key_bytes = key::row_key(table, row_id);
                            tx.remove(key_bytes)?;
                        }
                    }
                }
                Ok(())
            });

        match result {
            Ok(()) => Ok(()),
            Err(sled::transaction::TransactionError::Abort(e)) => Err(e),
            Err(sled::transaction::TransactionError::Storage(e)) => Err(Error::Storage(e)),
        }
    }

    /// Rollback the batch (discard all pending operations).
    pub fn rollback(self) {
        drop(self.ops);
    }
}

impl StorageEngine {
    /// Begin a new write batch.
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(self)
    }
}
