//! Task and session entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Minutes in a quick session. Not user-configurable.
pub const QUICK_SESSION_MIN: u32 = 5;

/// Kind of session the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Quick,
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    /// How the session is recorded in history.
    pub fn kind(self) -> SessionKind {
        match self {
            SessionType::Quick => SessionKind::Quick,
            SessionType::Focus => SessionKind::Focus,
            SessionType::ShortBreak | SessionType::LongBreak => SessionKind::Break,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::Quick => "Quick session",
            SessionType::Focus => "Focus session",
            SessionType::ShortBreak => "Short break",
            SessionType::LongBreak => "Long break",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Quick => "quick",
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "short-break",
            SessionType::LongBreak => "long-break",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(SessionType::Quick),
            "focus" => Ok(SessionType::Focus),
            "short-break" | "short_break" | "short" => Ok(SessionType::ShortBreak),
            "long-break" | "long_break" | "long" => Ok(SessionType::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "session_type".into(),
                message: format!("unknown session type '{other}'"),
            }),
        }
    }
}

/// Session category stored in history. Both break lengths record as `Break`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Quick,
    Focus,
    Break,
}

/// A unit of work the user wants to focus on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Accumulated focus time in seconds.
    #[serde(default)]
    pub focus_time: u64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task from a focus intent.
    ///
    /// The title is trimmed; a blank title is rejected.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(ValidationError::Empty {
                field: "title".into(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            focus_time: 0,
            created_at: Utc::now(),
        })
    }

    pub fn mark_completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Rename, applying the same rules as [`Task::new`].
    pub fn renamed(mut self, title: impl AsRef<str>) -> Result<Self, ValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(ValidationError::Empty {
                field: "title".into(),
            });
        }
        self.title = title.to_string();
        Ok(self)
    }
}

/// One timed interval.
///
/// Created unfinished when a session starts; finalized once on completion and
/// never touched again after being appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub task_id: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Planned length in seconds, fixed at creation.
    pub duration: u64,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(default)]
    pub completed: bool,
}

impl Session {
    pub(crate) fn begin(
        kind: SessionKind,
        task_id: Option<String>,
        duration: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            start_time: at,
            end_time: None,
            duration,
            kind,
            completed: false,
        }
    }

    pub(crate) fn finish(mut self, at: DateTime<Utc>) -> Self {
        self.end_time = Some(at);
        self.completed = true;
        self
    }
}

/// Stored records from older builds used `""` for "no task".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_new_trims_title() {
        let task = Task::new("  write report  ").unwrap();
        assert_eq!(task.title, "write report");
        assert!(!task.completed);
        assert_eq!(task.focus_time, 0);
    }

    #[test]
    fn task_new_rejects_blank_title() {
        assert!(matches!(
            Task::new("   "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn task_ids_are_unique() {
        let a = Task::new("a").unwrap();
        let b = Task::new("a").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn break_types_record_as_break() {
        assert_eq!(SessionType::ShortBreak.kind(), SessionKind::Break);
        assert_eq!(SessionType::LongBreak.kind(), SessionKind::Break);
        assert_eq!(SessionType::Quick.kind(), SessionKind::Quick);
        assert_eq!(SessionType::Focus.kind(), SessionKind::Focus);
    }

    #[test]
    fn session_type_parses_cli_spellings() {
        assert_eq!("short-break".parse::<SessionType>().unwrap(), SessionType::ShortBreak);
        assert_eq!("LONG".parse::<SessionType>().unwrap(), SessionType::LongBreak);
        assert!("nap".parse::<SessionType>().is_err());
    }

    #[test]
    fn session_json_uses_camel_case_and_type_tag() {
        let session = Session::begin(SessionKind::Focus, Some("t1".into()), 1500, Utc::now());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["type"], "focus");
        assert_eq!(json["taskId"], "t1");
        assert!(json.get("endTime").is_none());
    }

    #[test]
    fn empty_task_id_reads_as_none() {
        let json = r#"{"id":"1","taskId":"","startTime":"2024-01-01T00:00:00Z",
            "duration":300,"type":"quick","completed":true}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.task_id, None);
    }
}
