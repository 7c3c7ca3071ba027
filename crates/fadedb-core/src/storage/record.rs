//! Record type for stored rows.

use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};

/// A stored row with metadata.
///
/// The payload is the codec-encoded field list. Deletion state is not
/// tracked here: a soft-deleted row is an ordinary live record whose
/// deletion timestamp field is set.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct RowRecord {
    /// Encoded row data.
    pub data: Vec<u8>,

    /// Write timestamp in microseconds since Unix epoch.
    pub written_at: u64,
}

impl RowRecord {
    /// Create a new record with the current timestamp.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            written_at: super::key::current_timestamp(),
        }
    }

    /// Create a record with a specific timestamp.
    pub fn with_timestamp(data: Vec<u8>, written_at: u64) -> Self {
        Self { data, written_at }
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
