//! Focus session state machine: entities, settings, actions and transitions.

mod action;
mod model;
mod reducer;
mod settings;
mod state;

pub use action::Action;
pub use model::{Session, SessionKind, SessionType, Task, QUICK_SESSION_MIN};
pub use reducer::{reduce, Transition, TransitionError};
pub use settings::{normalize_domain, Settings, SettingsPatch};
pub use state::{BlockedContext, DurableState, FocusState, Phase, StatePatch};
