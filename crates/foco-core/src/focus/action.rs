use serde::{Deserialize, Serialize};

use super::model::{SessionType, Task};
use super::settings::SettingsPatch;
use super::state::StatePatch;

/// Everything a UI collaborator can ask the state machine to do.
///
/// Serialized as `{"type": "START_SESSION", "payload": "focus"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetCurrentTask(Task),
    StartSession(SessionType),
    StopSession,
    Tick,
    CompleteSession,
    AddTask(Task),
    UpdateTask(Task),
    /// Task id.
    DeleteTask(String),
    UpdateSettings(SettingsPatch),
    LoadState(StatePatch),
}

impl Action {
    /// Whether applying this action can change tasks, sessions, settings or
    /// the completed-session counter.
    pub fn touches_durable(&self) -> bool {
        matches!(
            self,
            Action::CompleteSession
                | Action::AddTask(_)
                | Action::UpdateTask(_)
                | Action::DeleteTask(_)
                | Action::UpdateSettings(_)
                | Action::LoadState(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetCurrentTask(_) => "SET_CURRENT_TASK",
            Action::StartSession(_) => "START_SESSION",
            Action::StopSession => "STOP_SESSION",
            Action::Tick => "TICK",
            Action::CompleteSession => "COMPLETE_SESSION",
            Action::AddTask(_) => "ADD_TASK",
            Action::UpdateTask(_) => "UPDATE_TASK",
            Action::DeleteTask(_) => "DELETE_TASK",
            Action::UpdateSettings(_) => "UPDATE_SETTINGS",
            Action::LoadState(_) => "LOAD_STATE",
        }
    }
}
