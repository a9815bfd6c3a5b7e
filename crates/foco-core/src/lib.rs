//! # Foco Core Library
//!
//! Core business logic for Foco, a focus timer with a blocked-site list.
//! The CLI is a thin layer over this crate; any other front end (desktop,
//! browser agent) drives the same controller.
//!
//! ## Architecture
//!
//! - **Focus state machine**: `FocusState` plus `Action`, applied by a
//!   reducer that performs no I/O
//! - **Scheduler**: a tokio-backed ticker that emits one tick per second
//!   while a session runs
//! - **Controller**: single owner of state, ticker and persistence
//! - **Storage**: the durable subset as JSON in a SQLite key-value table,
//!   TOML application config
//!
//! ## Key Components
//!
//! - [`FocusController`]: dispatches actions and runs sessions
//! - [`FocusState`]: the aggregate
//! - [`StateStore`]: persistence gateway
//! - [`FocusStats`]: history statistics

pub mod controller;
pub mod error;
pub mod events;
pub mod focus;
pub mod notifier;
pub mod scheduler;
pub mod stats;
pub mod storage;

pub use controller::{FocusController, SessionOutcome, DEFAULT_TICK_INTERVAL};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use focus::{
    reduce, Action, DurableState, FocusState, Phase, Session, SessionKind, SessionType, Settings,
    SettingsPatch, StatePatch, Task, TransitionError,
};
pub use notifier::{BellNotifier, Notifier, NotifyError, SilentNotifier};
pub use scheduler::{Ticker, TickerHandle};
pub use stats::FocusStats;
pub use storage::{AppConfig, Database, MemoryStore, SqliteStore, StateStore};
