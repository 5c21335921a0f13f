//! Cross-page handoff of the accepted submission
//!
//! The entry page saves the sanitized [`Submission`] under one well-known key
//! in the browser session's storage area; the response page reads it back.
//! Storage failures stay inside this module: every [`HandoffStore`]
//! operation returns a safe default instead of an error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use moka::sync::Cache as MokaCache;
use shared::Submission;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::metrics;
use crate::session_middleware::SessionId;

/// Key the handoff record is stored under
pub const STORAGE_KEY: &str = "helloWorldFormData";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("session storage is disabled")]
    Disabled,
    #[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("storage area lock poisoned")]
    Poisoned,
}

/// Key/value storage scoped to one browser session
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get_item(key)?.is_some())
    }
}

/// In-memory storage area with a byte quota over keys and values
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: usize,
}

impl MemoryStorage {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes,
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;

        let others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = others + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.contains_key(key))
    }
}

/// Storage that refuses every operation
pub struct DisabledStorage;

impl SessionStorage for DisabledStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Disabled)
    }

    fn set_item(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }
}

/// Total save/load/clear/exists over one session's storage area
#[derive(Clone)]
pub struct HandoffStore {
    storage: Arc<dyn SessionStorage>,
}

impl HandoffStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Serialize and store `submission`; `false` if it could not be written
    pub fn save(&self, submission: &Submission) -> bool {
        let serialized = match serde_json::to_string(submission) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize form data");
                metrics::record_handoff("save", "error");
                return false;
            }
        };

        match self.storage.set_item(STORAGE_KEY, serialized) {
            Ok(()) => {
                metrics::record_handoff("save", "ok");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save form data");
                metrics::record_handoff("save", "error");
                false
            }
        }
    }

    /// Stored submission, or `None` when absent, unreadable or not a submission
    pub fn load(&self) -> Option<Submission> {
        let serialized = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(s)) => s,
            Ok(None) => {
                metrics::record_handoff("load", "absent");
                return None;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load form data");
                metrics::record_handoff("load", "error");
                return None;
            }
        };

        match serde_json::from_str::<Submission>(&serialized) {
            Ok(submission) => {
                metrics::record_handoff("load", "ok");
                Some(submission)
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable form data");
                metrics::record_handoff("load", "corrupt");
                None
            }
        }
    }

    /// Remove the record; no-op if it is already gone
    pub fn clear(&self) {
        match self.storage.remove_item(STORAGE_KEY) {
            Ok(()) => metrics::record_handoff("clear", "ok"),
            Err(err) => {
                tracing::error!(error = %err, "failed to clear form data");
                metrics::record_handoff("clear", "error");
            }
        }
    }

    /// Whether a record is present, without deserializing it
    pub fn exists(&self) -> bool {
        match self.storage.contains_key(STORAGE_KEY) {
            Ok(present) => present,
            Err(err) => {
                tracing::warn!(error = %err, "failed to check for form data");
                metrics::record_handoff("exists", "error");
                false
            }
        }
    }
}

/// Storage areas of all live browser sessions.
///
/// Areas live in process memory only and are dropped after the configured
/// idle time, so nothing survives a restart or an abandoned session.
pub struct SessionRegistry {
    areas: MokaCache<String, Arc<dyn SessionStorage>>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        let areas = MokaCache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(config.idle_ttl)
            .build();

        tracing::info!(
            "Session registry created: enabled={}, idle_ttl={:?}, max_sessions={}",
            config.enabled,
            config.idle_ttl,
            config.max_sessions
        );

        Self { areas, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handoff store for `session`, creating its storage area on first use
    pub fn store_for(&self, session: &SessionId) -> HandoffStore {
        if !self.config.enabled {
            return HandoffStore::new(Arc::new(DisabledStorage));
        }

        let quota = self.config.quota_bytes;
        let storage = self.areas.get_with(session.as_str().to_string(), || {
            Arc::new(MemoryStorage::new(quota)) as Arc<dyn SessionStorage>
        });
        metrics::ACTIVE_SESSIONS.set(self.areas.entry_count() as i64);
        HandoffStore::new(storage)
    }

    /// Drop a session's storage area
    pub fn end_session(&self, session: &SessionId) {
        self.areas.invalidate(session.as_str());
    }

    pub fn session_count(&self) -> u64 {
        self.areas.run_pending_tasks();
        self.areas.entry_count()
    }
}
