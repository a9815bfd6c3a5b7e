//! Focus statistics over the session history.
//!
//! Only completed focus sessions count. Days are calendar days in the time
//! zone of the `now` passed in, so the CLI gets local days while tests can
//! pin UTC.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::{Session, SessionKind};

/// How far back the streak is searched.
const STREAK_WINDOW_DAYS: i64 = 30;
/// Days in the weekly breakdown.
const WEEK_DAYS: i64 = 7;

/// Focus minutes for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FocusStats {
    pub today_focus_secs: u64,
    pub total_focus_secs: u64,
    pub focus_sessions: u64,
    /// Consecutive days with at least one focus session, ending today (or
    /// yesterday when today has none yet).
    pub streak_days: u32,
    /// Oldest first, today last.
    pub last_seven_days: Vec<DayTotal>,
}

impl FocusStats {
    pub fn compute<Tz: TimeZone>(sessions: &[Session], now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let local_day = |at: &DateTime<Utc>| at.with_timezone(&tz).date_naive();

        let focus: Vec<(NaiveDate, u64)> = sessions
            .iter()
            .filter(|s| s.completed && s.kind == SessionKind::Focus)
            .map(|s| (local_day(&s.start_time), s.duration))
            .collect();

        let secs_on = |day: NaiveDate| -> u64 {
            focus
                .iter()
                .filter(|(d, _)| *d == day)
                .map(|(_, secs)| secs)
                .sum()
        };
        let has_session_on = |day: NaiveDate| focus.iter().any(|(d, _)| *d == day);

        let mut streak_days = 0;
        for offset in 0..STREAK_WINDOW_DAYS {
            let day = today - Duration::days(offset);
            if has_session_on(day) {
                streak_days += 1;
            } else if offset > 0 {
                break;
            }
        }

        let last_seven_days = (0..WEEK_DAYS)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset);
                DayTotal {
                    date,
                    minutes: secs_on(date) / 60,
                }
            })
            .collect();

        Self {
            today_focus_secs: secs_on(today),
            total_focus_secs: focus.iter().map(|(_, secs)| secs).sum(),
            focus_sessions: focus.len() as u64,
            streak_days,
            last_seven_days,
        }
    }

    /// Largest daily total in the week, at least 1 so it can scale a bar.
    pub fn weekly_max_minutes(&self) -> u64 {
        self.last_seven_days
            .iter()
            .map(|d| d.minutes)
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

/// `MM:SS`, minutes not wrapped at the hour.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `1h 5m`, or `25m` under an hour.
pub fn format_hours_minutes(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
