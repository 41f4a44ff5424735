use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{debug, warn, Logger};
use serde_json::Value;

use crate::config::StorageMode;
use crate::errors::BackendError;
use crate::submission::Submission;

mod file;
mod memory;

pub use file::FileSlots;
pub use memory::MemorySlots;

/// The slot holding every submission, newest first.
pub const SUBMISSIONS_SLOT: &str = "agentic_submissions";

/// The name offered for downloaded snapshots.
pub const EXPORT_FILE_NAME: &str = "submissions.json";

/// Durable string storage addressed by key.
pub trait SlotStorage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the slot does
    /// not exist.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;
}

/// The submissions collection on top of a [`SlotStorage`].
///
/// A detached store has no backing storage: it always reads as empty and
/// drops every write.
///
/// Clones share one write lock, so concurrent appends never drop records.
#[derive(Clone)]
pub struct LocalStore {
    logger: Logger,
    storage: Option<Arc<dyn SlotStorage>>,
    writes: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(logger: Logger, storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            logger,
            storage: Some(storage),
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn detached(logger: Logger) -> Self {
        Self {
            logger,
            storage: None,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Opens the store selected by configuration.
    pub fn open(logger: Logger, mode: StorageMode, directory: &Path) -> Result<Self, BackendError> {
        let store = match mode {
            StorageMode::File => Self::new(logger, Arc::new(FileSlots::open(directory)?)),
            StorageMode::Memory => Self::new(logger, Arc::new(MemorySlots::new())),
            StorageMode::None => Self::detached(logger),
        };

        Ok(store)
    }

    pub fn is_detached(&self) -> bool {
        self.storage.is_none()
    }

    /// Returns every stored submission, newest first. Missing, unreadable
    /// and corrupt slots all read as an empty collection. Entries that are
    /// not records are skipped.
    pub fn read_all(&self) -> Vec<Submission> {
        self.read_entries()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    warn!(self.logger, "Skipping unreadable submission"; "error" => %e);
                    None
                }
            })
            .collect()
    }

    /// Inserts `submission` at the front of the collection. Entries already
    /// stored are written back untouched.
    pub fn append(&self, submission: Submission) -> Result<(), BackendError> {
        let entry = serde_json::to_value(submission).map_err(BackendError::Serialization)?;

        let _guard = self.lock_writes();
        let mut all = self.read_entries();
        all.insert(0, entry);

        debug!(self.logger, "Saving submission..."; "count" => all.len());
        self.write(&all)
    }

    /// Replaces the collection with an empty one.
    pub fn clear(&self) -> Result<(), BackendError> {
        let _guard = self.lock_writes();

        debug!(self.logger, "Clearing submissions...");
        self.write(&[])
    }

    /// Creates the slot as an empty collection if it does not exist yet.
    pub fn warm_up(&self) -> Result<(), BackendError> {
        if let Some(storage) = &self.storage {
            let _guard = self.lock_writes();

            if storage.get(SUBMISSIONS_SLOT)?.is_none() {
                debug!(self.logger, "Initializing submissions slot...");
                storage.set(SUBMISSIONS_SLOT, "[]")?;
            }
        }

        Ok(())
    }

    /// Runs `f` against this store on the blocking thread pool.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, BackendError>
    where
        F: FnOnce(&LocalStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();

        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(BackendError::StorageTask)
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_entries(&self) -> Vec<Value> {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => return vec![],
        };

        let raw = match storage.get(SUBMISSIONS_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return vec![],
            Err(e) => {
                warn!(self.logger, "Failed to read submissions"; "error" => ?e);
                return vec![];
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(source) => {
                let e = BackendError::MalformedSlot {
                    key: SUBMISSIONS_SLOT.to_owned(),
                    source,
                };
                warn!(self.logger, "Discarding unreadable submissions"; "error" => %e);
                vec![]
            }
        }
    }

    fn write(&self, entries: &[Value]) -> Result<(), BackendError> {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => {
                debug!(self.logger, "Store is detached; dropping write");
                return Ok(());
            }
        };

        let raw = serde_json::to_string(entries).map_err(BackendError::Serialization)?;
        storage.set(SUBMISSIONS_SLOT, &raw)
    }
}

/// Serializes a snapshot for download: pretty-printed with two-space
/// indentation.
pub fn export_json(submissions: &[Submission]) -> Result<String, BackendError> {
    serde_json::to_string_pretty(submissions).map_err(BackendError::Serialization)
}
