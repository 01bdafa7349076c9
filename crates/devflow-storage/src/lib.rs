//! DevFlow storage
//!
//! Persistence adapter for the dashboard state:
//! - `KeyValueStore` backends (in-memory, directory of JSON files)
//! - `Database`, the typed facade over the workspace, notification and session records
//!
//! There are no transactions and no retries; every failure surfaces as a
//! [`StorageError`].

#![warn(unreachable_pub)]

pub mod database;
pub mod error;
pub mod kv;

pub use database::{Database, RecordKeys, DEFAULT_KEY_PREFIX};
pub use error::StorageError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
