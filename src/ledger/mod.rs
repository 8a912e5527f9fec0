//! Wallet ledger
//!
//! - **types**: `Entry`, `EntryId`, `Summary` and the aggregate functions
//! - **store**: `EntryStore`, the write-through entry list with subscribers
//! - **confirm**: the yes/no capability used before clearing everything
//!
//! # Example
//!
//! ```rust
//! use dompetku::ledger::{Entry, EntryId, EntryStore, DEFAULT_KEY};
//! use dompetku::storage::MemoryStore;
//!
//! let mut store = EntryStore::open(MemoryStore::new(), DEFAULT_KEY)?;
//! store.add_entry(Entry::new(1, 100.0).label("Gaji"))?;
//! store.add_entry(Entry::new(2, -40.0).label("Makan"))?;
//! assert_eq!(store.balance(), 60.0);
//!
//! store.delete_entry(&EntryId::from(1))?;
//! assert_eq!(store.balance(), -40.0);
//! # Ok::<(), dompetku::storage::StorageError>(())
//! ```

pub mod confirm;
pub mod store;
pub mod types;

pub use confirm::{Confirm, CLEAR_ALL_PROMPT};
pub use store::{backup_key_for, EntryStore, LoadIssue, StoreEvent, SubscriptionId, DEFAULT_KEY};
pub use types::{Entry, EntryId, Summary};
