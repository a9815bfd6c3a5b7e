//! The focus aggregate and its persisted subset.

use serde::{Deserialize, Serialize};

use super::model::{Session, SessionType, Task};
use super::settings::Settings;

/// Phase derived from the aggregate's fields.
///
/// ```text
/// Idle -> Configuring -> Running -> Expired -> (Idle | Running)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// No task chosen, nothing running.
    Idle,
    /// Task chosen, ready to start.
    Configuring,
    Running,
    /// Countdown reached zero; waiting for completion or the user's next pick.
    Expired,
}

/// Context handed to the external blocking agent for its "blocked" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedContext {
    pub task_title: Option<String>,
    /// Only present while a session runs.
    pub time_remaining: Option<u64>,
}

/// Aggregate root for the focus tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub current_task: Option<Task>,
    pub current_session: Option<Session>,
    /// Seconds left in the current session.
    pub time_remaining: u64,
    pub is_active: bool,
    pub session_type: Option<SessionType>,
    pub tasks: Vec<Task>,
    /// Completed sessions, append-only.
    pub sessions: Vec<Session>,
    pub settings: Settings,
    pub completed_sessions: u32,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            current_task: None,
            current_session: None,
            time_remaining: 0,
            is_active: false,
            session_type: None,
            tasks: Vec::new(),
            sessions: Vec::new(),
            settings: Settings::default(),
            completed_sessions: 0,
        }
    }
}

impl FocusState {
    pub fn phase(&self) -> Phase {
        if self.is_active {
            Phase::Running
        } else if self.session_type.is_some() && self.time_remaining == 0 {
            Phase::Expired
        } else if self.current_task.is_some() {
            Phase::Configuring
        } else {
            Phase::Idle
        }
    }

    /// A session exists whose countdown has run out but which has not been
    /// recorded yet.
    pub fn needs_completion(&self) -> bool {
        self.time_remaining == 0
            && self
                .current_session
                .as_ref()
                .is_some_and(|s| !s.completed)
    }

    /// Break to offer next: long every `sessions_until_long_break` focus
    /// sessions, short otherwise.
    pub fn next_break(&self) -> SessionType {
        let every = self.settings.sessions_until_long_break;
        if self.completed_sessions > 0 && every > 0 && self.completed_sessions % every == 0 {
            SessionType::LongBreak
        } else {
            SessionType::ShortBreak
        }
    }

    /// Session to offer after `finished`: quick and break sessions lead to
    /// focus, focus leads to the next break.
    pub fn next_step(&self, finished: SessionType) -> SessionType {
        match finished {
            SessionType::Focus => self.next_break(),
            SessionType::Quick | SessionType::ShortBreak | SessionType::LongBreak => {
                SessionType::Focus
            }
        }
    }

    /// Length of the current session in seconds, 0 when none.
    pub fn total_secs(&self) -> u64 {
        self.current_session.as_ref().map(|s| s.duration).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return if self.needs_completion() { 1.0 } else { 0.0 };
        }
        1.0 - (self.time_remaining.min(total) as f64 / total as f64)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn blocked_context(&self) -> BlockedContext {
        BlockedContext {
            task_title: self.current_task.as_ref().map(|t| t.title.clone()),
            time_remaining: self.is_active.then_some(self.time_remaining),
        }
    }

    /// Copy out the persisted subset.
    pub fn durable(&self) -> DurableState {
        DurableState {
            tasks: self.tasks.clone(),
            sessions: self.sessions.clone(),
            settings: self.settings.clone(),
            completed_sessions: self.completed_sessions,
        }
    }
}

/// The part of the state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurableState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub completed_sessions: u32,
}

/// Partial durable state, merged over the current state by `LoadState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<Session>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_sessions: Option<u32>,
}

impl From<DurableState> for StatePatch {
    fn from(d: DurableState) -> Self {
        Self {
            tasks: Some(d.tasks),
            sessions: Some(d.sessions),
            settings: Some(d.settings),
            completed_sessions: Some(d.completed_sessions),
        }
    }
}
