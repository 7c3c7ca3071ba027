//! Storage layer for FadeDB.
//!
//! This module provides a sled-based storage engine keyed by table and row ID.

mod batch;
mod codec;
mod config;
mod engine;
mod record;

pub mod key;

pub use batch::{BatchOp, WriteBatch};
pub use codec::{decode_row, encode_row};
pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use record::RowRecord;
