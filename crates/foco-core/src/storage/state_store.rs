//! Persistence gateway for the durable subset of the focus state.

use std::sync::Mutex;

use super::database::Database;
use crate::error::StorageError;
use crate::focus::DurableState;

/// Key the durable record is stored under.
pub const STATE_KEY: &str = "focus_state";

/// Loads and saves the durable subset (tasks, sessions, settings,
/// completed-session count).
pub trait StateStore {
    /// Read the stored record.
    ///
    /// A missing or unreadable record is `Ok(None)`; only backend failures
    /// are errors.
    fn load(&self) -> Result<Option<DurableState>, StorageError>;

    fn save(&self, state: &DurableState) -> Result<(), StorageError>;

    /// Forget the stored record.
    fn clear(&self) -> Result<(), StorageError>;
}

fn decode(raw: &str) -> Option<DurableState> {
    match serde_json::from_str::<DurableState>(raw) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!("ignoring malformed stored state: {e}");
            None
        }
    }
}

/// Stores the record as JSON in the SQLite `kv` table.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl StateStore for SqliteStore {
    fn load(&self) -> Result<Option<DurableState>, StorageError> {
        Ok(self.db.kv_get(STATE_KEY)?.as_deref().and_then(decode))
    }

    fn save(&self, state: &DurableState) -> Result<(), StorageError> {
        let json = serde_json::to_string(state)?;
        self.db.kv_set(STATE_KEY, &json)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.db.kv_delete(STATE_KEY)
    }
}

/// In-process store holding the serialized record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary stored payload, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The payload as last written.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a complete string.
        self.raw.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<DurableState>, StorageError> {
        Ok(self.lock().as_deref().and_then(decode))
    }

    fn save(&self, state: &DurableState) -> Result<(), StorageError> {
        *self.lock() = Some(serde_json::to_string(state)?);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn load(&self) -> Result<Option<DurableState>, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &DurableState) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::{Session, SessionKind, Settings, Task};
    use chrono::Utc;

    fn sample() -> DurableState {
        let task = Task::new("ship it").unwrap();
        let now = Utc::now();
        let session = Session {
            id: "s1".into(),
            task_id: Some(task.id.clone()),
            start_time: now,
            end_time: Some(now),
            duration: 1500,
            kind: SessionKind::Focus,
            completed: true,
        };
        DurableState {
            tasks: vec![task],
            sessions: vec![session],
            settings: Settings {
                focus_time: 40,
                ..Settings::default()
            },
            completed_sessions: 1,
        }
    }

    #[test]
    fn sqlite_round_trip() {
        let store = SqliteStore::new(Database::open_memory().unwrap());
        assert!(store.load().unwrap().is_none());
        let state = sample();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn memory_round_trip_and_clear() {
        let store = MemoryStore::new();
        let state = sample();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn malformed_record_loads_as_none() {
        let store = MemoryStore::with_raw("{not json");
        assert!(store.load().unwrap().is_none());

        let db = Database::open_memory().unwrap();
        db.kv_set(STATE_KEY, r#"{"tasks": 12}"#).unwrap();
        let store = SqliteStore::new(db);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn partial_record_fills_defaults() {
        let store = MemoryStore::with_raw(r#"{"completedSessions": 3}"#);
        let state = store.load().unwrap().unwrap();
        assert_eq!(state.completed_sessions, 3);
        assert_eq!(state.settings, Settings::default());
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn stores_under_well_known_key() {
        let store = SqliteStore::new(Database::open_memory().unwrap());
        store.save(&sample()).unwrap();
        let raw = store.database().kv_get(STATE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["completedSessions"], 1);
        assert_eq!(json["settings"]["focusTime"], 40);
    }
}
