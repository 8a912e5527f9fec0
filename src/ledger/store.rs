//! Entry store
//!
//! Holds the ordered list of entries and mirrors it to one key of a
//! [`KeyValueStore`] after every mutation:
//!
//! ```text
//! add/delete/clear → mutate Vec<Entry> → save (JSON array, full overwrite) → notify listeners
//! ```
//!
//! Aggregates are computed from the list on every call; nothing is cached.
//!
//! A failed write is returned to the caller but the in-memory change is
//! kept, so memory and storage can diverge until the next successful save.

use crate::ledger::confirm::{Confirm, CLEAR_ALL_PROMPT};
use crate::ledger::types::{self, Entry, EntryId, Summary};
use crate::storage::{KeyValueStore, StorageError, StorageResult};
use serde_json::Value;

/// Default key the entries are persisted under
pub const DEFAULT_KEY: &str = "entries";

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// An entry was appended
    Added(Entry),
    /// `delete_entry` ran; `removed` may be zero
    Deleted { id: EntryId, removed: usize },
    /// Confirmed clear-all
    Cleared { removed: usize },
}

/// Handle returned by [`EntryStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Why some or all of the persisted value was ignored at open time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    pub key: String,
    /// First parse error, with a count of any further ones
    pub message: String,
    /// Positions in the persisted array of entries that could not be read.
    /// Empty when the document as a whole was unreadable.
    pub skipped: Vec<usize>,
    /// Key holding an untouched copy of the persisted value
    pub backup_key: String,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Ledger state with write-through persistence
pub struct EntryStore<S: KeyValueStore> {
    backend: S,
    key: String,
    entries: Vec<Entry>,
    load_issue: Option<LoadIssue>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Open the store, keeping every readable entry.
    ///
    /// Entries that cannot be read are skipped; a document that is not an
    /// array at all yields an empty list. In both cases the original value
    /// is first copied to [`backup_key_for`]`(key)` so the next save cannot
    /// destroy it, and the details are kept in
    /// [`load_issue`](Self::load_issue).
    ///
    /// Errors only when the backend fails to read or to write the backup.
    pub fn open(mut backend: S, key: impl Into<String>) -> StorageResult<Self> {
        let key = key.into();
        let raw = backend.get(&key)?;
        let (entries, problem) = parse_entries(raw.as_deref());

        let load_issue = match (problem, raw) {
            (Some((message, skipped)), Some(raw)) => {
                let backup_key = backup_key_for(&key);
                backend.set(&backup_key, &raw)?;
                tracing::warn!(
                    key = %key,
                    backup = %backup_key,
                    skipped = skipped.len(),
                    error = %message,
                    "Ledger data partly unreadable; original backed up"
                );
                Some(LoadIssue {
                    key: key.clone(),
                    message,
                    skipped,
                    backup_key,
                })
            }
            _ => None,
        };

        Ok(Self::with_entries(backend, key, entries, load_issue))
    }

    /// Open the store, failing with [`StorageError::Corrupt`] when any
    /// part of the persisted value cannot be read. Nothing is written.
    pub fn open_strict(backend: S, key: impl Into<String>) -> StorageResult<Self> {
        let key = key.into();
        let raw = backend.get(&key)?;

        match parse_entries(raw.as_deref()) {
            (_, Some((message, _))) => Err(StorageError::Corrupt { key, message }),
            (entries, None) => Ok(Self::with_entries(backend, key, entries, None)),
        }
    }

    fn with_entries(
        backend: S,
        key: String,
        entries: Vec<Entry>,
        load_issue: Option<LoadIssue>,
    ) -> Self {
        tracing::info!(key = %key, entries = entries.len(), "Opened ledger");

        Self {
            backend,
            key,
            entries,
            load_issue,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// What was skipped at open, if anything
    pub fn load_issue(&self) -> Option<&LoadIssue> {
        self.load_issue.as_ref()
    }

    /// Key this store persists under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The persistence backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Give back the backend, dropping in-memory state
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Append `entry` and persist.
    ///
    /// NaN and infinite amounts have no JSON form, so such entries are
    /// rejected with [`StorageError::NonFiniteAmount`] before any change.
    pub fn add_entry(&mut self, entry: Entry) -> StorageResult<()> {
        if !entry.amount.is_finite() {
            return Err(StorageError::NonFiniteAmount {
                id: entry.id.to_string(),
                amount: entry.amount,
            });
        }

        self.entries.push(entry.clone());
        tracing::debug!(id = %entry.id, amount = entry.amount, total = self.entries.len(), "Added entry");

        let result = self.save();
        self.notify(&StoreEvent::Added(entry));
        result
    }

    /// Remove every entry with this id and persist.
    ///
    /// Persists even when nothing matched. Returns how many were removed.
    pub fn delete_entry(&mut self, id: &EntryId) -> StorageResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        let removed = before - self.entries.len();
        tracing::debug!(id = %id, removed, total = self.entries.len(), "Deleted entries");

        let result = self.save();
        self.notify(&StoreEvent::Deleted {
            id: id.clone(),
            removed,
        });
        result.map(|()| removed)
    }

    /// Wipe all entries after asking `confirm`.
    ///
    /// Returns `Ok(false)` without touching state or storage when declined.
    pub fn clear_all_entries<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> StorageResult<bool> {
        if !confirm.confirm(CLEAR_ALL_PROMPT) {
            tracing::debug!("Clear-all declined");
            return Ok(false);
        }

        let removed = self.entries.len();
        self.entries.clear();
        tracing::info!(removed, "Cleared all entries");

        let result = self.save();
        self.notify(&StoreEvent::Cleared { removed });
        result.map(|()| true)
    }

    /// Serialize the current entries and overwrite the persisted value
    pub fn save(&mut self) -> StorageResult<()> {
        let content = serde_json::to_string(&self.entries)?;
        self.backend.set(&self.key, &content)
    }

    /// Number of entries
    pub fn total_entries(&self) -> usize {
        self.entries.len()
    }

    /// Sum of positive amounts
    pub fn total_income(&self) -> f64 {
        types::total_income(&self.entries)
    }

    /// Sum of absolute negative amounts
    pub fn total_expense(&self) -> f64 {
        types::total_expense(&self.entries)
    }

    /// `total_income - total_expense`
    pub fn balance(&self) -> f64 {
        self.total_income() - self.total_expense()
    }

    /// All four aggregates at once
    pub fn summary(&self) -> Summary {
        Summary::from_entries(&self.entries)
    }

    /// Register a listener called after every mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl<S: KeyValueStore> std::fmt::Debug for EntryStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("key", &self.key)
            .field("entries", &self.entries.len())
            .field("listeners", &self.listeners.len())
            .field("load_issue", &self.load_issue)
            .finish()
    }
}

/// Key the original value is copied to when `key` is partly unreadable
pub fn backup_key_for(key: &str) -> String {
    format!("{}.unreadable", key)
}

/// Parse the persisted array one entry at a time.
///
/// Absent, blank and `null` all mean "no entries yet". Returns the readable
/// entries plus, if anything was dropped, the error message and the
/// positions of the dropped entries.
fn parse_entries(raw: Option<&str>) -> (Vec<Entry>, Option<(String, Vec<usize>)>) {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return (Vec::new(), None),
    };

    let values = match serde_json::from_str::<Option<Vec<Value>>>(raw) {
        Ok(values) => values.unwrap_or_default(),
        Err(e) => return (Vec::new(), Some((e.to_string(), Vec::new()))),
    };

    let mut entries = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();
    let mut first_error = None;

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Entry>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                first_error.get_or_insert_with(|| format!("entry {}: {}", index, e));
                skipped.push(index);
            }
        }
    }

    match first_error {
        None => (entries, None),
        Some(message) if skipped.len() > 1 => {
            let message = format!("{} (and {} more)", message, skipped.len() - 1);
            (entries, Some((message, skipped)))
        }
        Some(message) => (entries, Some((message, skipped))),
    }
}
