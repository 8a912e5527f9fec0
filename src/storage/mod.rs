//! Dompetku persistence layer
//!
//! - **kv**: the key-value facility (`KeyValueStore`) and its backends
//! - **error**: error types
//!
//! The ledger keeps its whole state under a single key as a JSON array;
//! every mutation rewrites that key in full.

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
