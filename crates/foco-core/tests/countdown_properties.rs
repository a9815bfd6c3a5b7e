//! Property tests for the countdown and session bookkeeping.

use chrono::Utc;
use foco_core::{reduce, Action, FocusState, SessionType, SettingsPatch};
use proptest::prelude::*;

fn session_type() -> impl Strategy<Value = SessionType> {
    prop_oneof![
        Just(SessionType::Quick),
        Just(SessionType::Focus),
        Just(SessionType::ShortBreak),
        Just(SessionType::LongBreak),
    ]
}

fn started(kind: SessionType, minutes: u32) -> FocusState {
    let mut state = FocusState::default();
    state
        .apply(
            Action::UpdateSettings(SettingsPatch {
                focus_time: Some(minutes),
                short_break: Some(minutes),
                long_break: Some(minutes),
                ..Default::default()
            }),
            Utc::now(),
        )
        .unwrap();
    state
        .apply(Action::StartSession(kind), Utc::now())
        .unwrap();
    state
}

proptest! {
    #[test]
    fn countdown_is_monotonic_and_ends_on_time(kind in session_type(), minutes in 1u32..6) {
        let mut state = started(kind, minutes);
        let duration = state.time_remaining;
        prop_assert_eq!(duration, state.settings.duration_secs(kind));

        let mut ticks = 0u64;
        while state.is_active {
            let before = state.time_remaining;
            state.apply(Action::Tick, Utc::now()).unwrap();
            ticks += 1;
            prop_assert_eq!(state.time_remaining, before - 1);
        }
        prop_assert_eq!(ticks, duration);
        prop_assert_eq!(state.time_remaining, 0);
        prop_assert!(state.needs_completion());

        // Extra ticks are no-ops.
        let idle = state.clone();
        state.apply(Action::Tick, Utc::now()).unwrap();
        prop_assert_eq!(state, idle);
    }

    #[test]
    fn stop_never_records(kind in session_type(), minutes in 1u32..4, ticks in 0usize..200) {
        let mut state = started(kind, minutes);
        for _ in 0..ticks {
            state.apply(Action::Tick, Utc::now()).unwrap();
        }
        let history = state.sessions.clone();
        let count = state.completed_sessions;
        state.apply(Action::StopSession, Utc::now()).unwrap();
        prop_assert_eq!(state.sessions, history);
        prop_assert_eq!(state.completed_sessions, count);
        prop_assert!(!state.is_active);
        prop_assert!(state.current_session.is_none());
    }

    #[test]
    fn only_focus_completions_are_counted(kinds in proptest::collection::vec(session_type(), 1..12)) {
        let mut state = FocusState::default();
        let mut focus = 0u32;
        for kind in kinds {
            state = started_from(state, kind);
            state = reduce(&state, Action::CompleteSession, Utc::now()).unwrap().state;
            if kind == SessionType::Focus {
                focus += 1;
            }
            prop_assert_eq!(state.completed_sessions, focus);
        }
        prop_assert!(state.sessions.iter().all(|s| s.completed));
    }
}

fn started_from(mut state: FocusState, kind: SessionType) -> FocusState {
    state
        .apply(Action::StartSession(kind), Utc::now())
        .unwrap();
    state
}
