//! State transitions.
//!
//! `FocusState::apply` is the only code that mutates the aggregate. It checks
//! every precondition before touching a field, so a rejected action leaves the
//! state exactly as it was. Side effects (persistence, sound, scheduling) are
//! left to the controller, which observes the resulting state.
//!
//! ## Transitions
//!
//! ```text
//! Idle/Configuring --START_SESSION--> Running
//! Running --TICK (last second)--> Expired
//! Expired --COMPLETE_SESSION--> Configuring (session appended to history)
//! Running/Expired --STOP_SESSION--> Configuring (nothing recorded)
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::action::Action;
use super::model::{Session, SessionKind, SessionType, Task};
use super::settings::normalize_sites;
use super::state::{FocusState, StatePatch};
use crate::events::Event;

/// Why an action was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a {0} session is already running")]
    SessionAlreadyActive(SessionType),

    #[error("no session to complete")]
    NoSession,

    #[error("task '{0}' already exists")]
    DuplicateTask(String),

    #[error("task '{0}' not found")]
    TaskNotFound(String),
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: FocusState,
    pub event: Option<Event>,
}

/// Pure form of [`FocusState::apply`]: the input state is left untouched.
pub fn reduce(
    state: &FocusState,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Transition, TransitionError> {
    let mut next = state.clone();
    let event = next.apply(action, now)?;
    Ok(Transition { state: next, event })
}

impl FocusState {
    /// Apply one action in place.
    pub fn apply(
        &mut self,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, TransitionError> {
        match action {
            Action::SetCurrentTask(task) => {
                let task_id = task.id.clone();
                self.current_task = Some(task);
                Ok(Some(Event::CurrentTaskChanged { task_id, at: now }))
            }
            Action::StartSession(session_type) => self.start_session(session_type, now),
            Action::StopSession => Ok(Some(self.stop_session(now))),
            Action::Tick => Ok(self.tick(now)),
            Action::CompleteSession => self.complete_session(now).map(Some),
            Action::AddTask(task) => {
                if self.task(&task.id).is_some() {
                    return Err(TransitionError::DuplicateTask(task.id));
                }
                let task_id = task.id.clone();
                self.tasks.push(task);
                Ok(Some(Event::TaskAdded { task_id, at: now }))
            }
            Action::UpdateTask(task) => {
                let slot = self
                    .tasks
                    .iter_mut()
                    .find(|t| t.id == task.id)
                    .ok_or_else(|| TransitionError::TaskNotFound(task.id.clone()))?;
                *slot = task.clone();
                if self.current_task.as_ref().is_some_and(|t| t.id == task.id) {
                    self.current_task = Some(task.clone());
                }
                Ok(Some(Event::TaskUpdated {
                    task_id: task.id,
                    at: now,
                }))
            }
            Action::DeleteTask(task_id) => {
                let idx = self
                    .tasks
                    .iter()
                    .position(|t| t.id == task_id)
                    .ok_or_else(|| TransitionError::TaskNotFound(task_id.clone()))?;
                self.tasks.remove(idx);
                if self.current_task.as_ref().is_some_and(|t| t.id == task_id) {
                    self.current_task = None;
                }
                Ok(Some(Event::TaskDeleted { task_id, at: now }))
            }
            Action::UpdateSettings(patch) => {
                self.settings.apply(patch);
                Ok(Some(Event::SettingsUpdated { at: now }))
            }
            Action::LoadState(patch) => {
                self.load(patch);
                Ok(Some(Event::StateLoaded {
                    tasks: self.tasks.len(),
                    sessions: self.sessions.len(),
                    at: now,
                }))
            }
        }
    }

    fn start_session(
        &mut self,
        session_type: SessionType,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, TransitionError> {
        if self.is_active {
            let running = self.session_type.unwrap_or(session_type);
            return Err(TransitionError::SessionAlreadyActive(running));
        }

        let duration = self.settings.duration_secs(session_type);
        let task_id = self.current_task.as_ref().map(|t| t.id.clone());
        // An expired session that was never completed is dropped here.
        let session = Session::begin(session_type.kind(), task_id.clone(), duration, now);
        let session_id = session.id.clone();

        self.current_session = Some(session);
        self.time_remaining = duration;
        self.is_active = true;
        self.session_type = Some(session_type);

        Ok(Some(Event::SessionStarted {
            session_id,
            session_type,
            task_id,
            duration_secs: duration,
            at: now,
        }))
    }

    fn stop_session(&mut self, now: DateTime<Utc>) -> Event {
        let event = Event::SessionStopped {
            session_type: self.session_type,
            remaining_secs: self.time_remaining,
            at: now,
        };
        self.current_session = None;
        self.time_remaining = 0;
        self.is_active = false;
        self.session_type = None;
        event
    }

    fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active || self.time_remaining == 0 {
            return None;
        }
        if self.time_remaining > 1 {
            self.time_remaining -= 1;
            return None;
        }

        self.time_remaining = 0;
        self.is_active = false;
        let session = self.current_session.as_ref()?;
        Some(Event::SessionExpired {
            session_id: session.id.clone(),
            session_type: self.session_type?,
            at: now,
        })
    }

    fn complete_session(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        let session = self.current_session.take().ok_or(TransitionError::NoSession)?;
        let session_type = self.session_type.unwrap_or(match session.kind {
            SessionKind::Quick => SessionType::Quick,
            SessionKind::Focus => SessionType::Focus,
            SessionKind::Break => SessionType::ShortBreak,
        });
        let finished = session.finish(now);

        if session_type == SessionType::Focus {
            self.completed_sessions = self.completed_sessions.saturating_add(1);
        }
        if finished.kind != SessionKind::Break {
            if let Some(task_id) = finished.task_id.as_deref() {
                self.credit_focus_time(task_id, finished.duration);
            }
        }

        let event = Event::SessionCompleted {
            session_id: finished.id.clone(),
            session_type,
            duration_secs: finished.duration,
            completed_sessions: self.completed_sessions,
            next: self.next_step(session_type),
            at: now,
        };

        self.sessions.push(finished);
        self.time_remaining = 0;
        self.is_active = false;
        self.session_type = None;
        Ok(event)
    }

    fn credit_focus_time(&mut self, task_id: &str, secs: u64) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.focus_time = task.focus_time.saturating_add(secs);
        }
        if let Some(task) = self.current_task.as_mut().filter(|t| t.id == task_id) {
            task.focus_time = task.focus_time.saturating_add(secs);
        }
    }

    fn load(&mut self, patch: StatePatch) {
        if let Some(tasks) = patch.tasks {
            self.tasks = dedup_tasks(tasks);
        }
        if let Some(sessions) = patch.sessions {
            let before = sessions.len();
            self.sessions = sessions.into_iter().filter(|s| s.completed).collect();
            if self.sessions.len() != before {
                tracing::warn!(
                    "dropped {} unfinished session(s) from loaded state",
                    before - self.sessions.len()
                );
            }
        }
        if let Some(mut settings) = patch.settings {
            settings.blocked_sites = normalize_sites(settings.blocked_sites);
            self.settings = settings;
        }
        if let Some(count) = patch.completed_sessions {
            self.completed_sessions = count;
        }
    }
}

fn dedup_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut out: Vec<Task> = Vec::with_capacity(tasks.len());
    for task in tasks {
        if out.iter().any(|t| t.id == task.id) {
            tracing::warn!("dropping duplicate task id '{}' from loaded state", task.id);
            continue;
        }
        out.push(task);
    }
    out
}
