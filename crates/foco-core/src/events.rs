use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::{FocusState, Phase, SessionType};

/// Every state change in the system produces an Event.
/// UIs render from them instead of diffing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: String,
        session_type: SessionType,
        task_id: Option<String>,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the session is not recorded yet.
    SessionExpired {
        session_id: String,
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        session_type: SessionType,
        duration_secs: u64,
        completed_sessions: u32,
        /// Session to offer the user next.
        next: SessionType,
        at: DateTime<Utc>,
    },
    /// Session aborted; nothing recorded.
    SessionStopped {
        session_type: Option<SessionType>,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CurrentTaskChanged {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        at: DateTime<Utc>,
    },
    StateLoaded {
        tasks: usize,
        sessions: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        session_type: Option<SessionType>,
        task_title: Option<String>,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        completed_sessions: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Build a full state snapshot event.
    pub fn snapshot(state: &FocusState) -> Self {
        Event::StateSnapshot {
            phase: state.phase(),
            session_type: state.session_type,
            task_title: state.current_task.as_ref().map(|t| t.title.clone()),
            remaining_secs: state.time_remaining,
            total_secs: state.total_secs(),
            progress_pct: (state.progress() * 100.0).min(100.0),
            completed_sessions: state.completed_sessions,
            at: Utc::now(),
        }
    }
}
