//! # Dompetku
//!
//! A personal wallet ledger: record income and expense entries, keep them in
//! a local key-value slot, and read back income, expense and balance totals.
//!
//! ## Modules
//!
//! - [`ledger`]: entries, the write-through entry store and its aggregates
//! - [`storage`]: key-value persistence backends
//! - [`export`]: CSV and JSON dumps of the ledger
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dompetku::ledger::{Entry, EntryStore, DEFAULT_KEY};
//! use dompetku::storage::FileStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = EntryStore::open(FileStore::new("./dompetku_data"), DEFAULT_KEY)?;
//!
//!     store.add_entry(Entry::new(1, 5_000_000.0).label("Gaji"))?;
//!     store.add_entry(Entry::new(2, -150_000.0).label("Listrik").category("bills"))?;
//!
//!     println!("{}", store.summary());
//!
//!     // Ask before wiping everything
//!     store.clear_all_entries(&mut |question: &str| {
//!         println!("{question} (auto-declined)");
//!         false
//!     })?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod ledger;
pub mod storage;

// Re-export top-level types for convenience
pub use ledger::{
    Confirm, Entry, EntryId, EntryStore, LoadIssue, StoreEvent, SubscriptionId, Summary,
    CLEAR_ALL_PROMPT, DEFAULT_KEY,
};

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};

pub use export::{ExportError, ExportFormat};

pub use config::{Config, ConfigError, LoggingConfig, StorageConfig};
