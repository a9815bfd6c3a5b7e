//! The single owner of the focus state.
//!
//! `FocusController` holds the aggregate, the persistence gateway, the
//! notifier and at most one live ticker. UI code never mutates state
//! directly; it calls [`FocusController::dispatch`] and renders the returned
//! events.
//!
//! ## Ticking
//!
//! With [`FocusController::with_ticker`] the controller installs a
//! [`Ticker`](crate::scheduler::Ticker) whenever a session starts. Each tick
//! is tagged with the generation of the session that installed it, and
//! [`FocusController::run_session`] drops ticks from older generations, so a
//! replaced or cancelled ticker can never decrement the new countdown.
//! Without a ticker the caller drives the countdown with
//! [`FocusController::tick`].

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::error::{Result, StorageError};
use crate::events::Event;
use crate::focus::{Action, FocusState, SessionType, Task};
use crate::notifier::{Notifier, SilentNotifier};
use crate::scheduler::{Ticker, TickerHandle};
use crate::storage::StateStore;

/// Cadence used by [`FocusController::run_session`] when none was configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Message sent by the ticker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickSignal {
    generation: u64,
}

/// How a foreground session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Ran to zero and was recorded; carries the `SessionCompleted` event.
    Completed(Event),
    /// Aborted by the shutdown signal; nothing recorded.
    Stopped,
    /// No session was running.
    Idle,
}

pub struct FocusController<S: StateStore> {
    state: FocusState,
    store: S,
    notifier: Box<dyn Notifier>,
    tick_interval: Option<Duration>,
    ticker: Option<TickerHandle>,
    generation: u64,
    tick_tx: mpsc::UnboundedSender<TickSignal>,
    tick_rx: mpsc::UnboundedReceiver<TickSignal>,
}

impl<S: StateStore> FocusController<S> {
    /// Build a controller and load the durable state from `store`.
    ///
    /// Missing or unreadable stored state leaves the defaults in place.
    pub fn new(store: S) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let mut controller = Self {
            state: FocusState::default(),
            store,
            notifier: Box::new(SilentNotifier),
            tick_interval: None,
            ticker: None,
            generation: 0,
            tick_tx,
            tick_rx,
        };
        controller.load();
        controller
    }

    /// Use `notifier` for completion chimes.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Drive running sessions with a ticker firing every `interval`.
    ///
    /// Sessions must then be started from within a tokio runtime.
    pub fn with_ticker(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    fn load(&mut self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("could not load stored state, using defaults: {e}");
                None
            }
        };
        let Some(durable) = stored else {
            return;
        };
        // LOAD_STATE cannot be rejected.
        if let Ok(Some(event)) = self
            .state
            .apply(Action::LoadState(durable.clone().into()), Utc::now())
        {
            tracing::debug!(?event, "state loaded");
        }
        // Write back whatever loading dropped or normalized.
        if self.state.durable() != durable {
            if let Err(e) = self.persist() {
                tracing::warn!("failed to save sanitized state: {e}");
            }
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a ticker is currently installed.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Apply an action and run the follow-up effects.
    ///
    /// Effects: the ticker is replaced on session start and cancelled once
    /// the session is no longer running; an expired session is completed
    /// exactly once; the durable subset is saved when it may have changed.
    /// Save failures are logged, not returned; use [`Self::persist`] to
    /// surface them.
    ///
    /// # Errors
    /// Returns the transition error when the reducer rejects the action; the
    /// state is unchanged in that case.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Event>> {
        let name = action.name();
        let started = matches!(action, Action::StartSession(_));
        let mut persist = action.touches_durable();

        let event = self.state.apply(action, Utc::now()).map_err(|e| {
            tracing::debug!(action = name, "rejected: {e}");
            e
        })?;
        tracing::debug!(action = name, phase = ?self.state.phase(), "applied");

        let mut events: Vec<Event> = event.into_iter().collect();

        if started {
            self.restart_ticker();
        }
        if !self.state.is_active {
            self.cancel_ticker();
        }
        if self.state.needs_completion() {
            events.extend(self.complete_expired());
            persist = true;
        }

        if persist {
            if let Err(e) = self.persist() {
                tracing::warn!(action = name, "failed to save state: {e}");
            }
        }

        for event in &events {
            log_event(event);
        }
        Ok(events)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        self.dispatch(Action::Tick)
    }

    /// Write the durable subset to the store.
    pub fn persist(&self) -> Result<(), StorageError> {
        self.store.save(&self.state.durable())
    }

    /// Forget all durable data, in the store and in memory.
    ///
    /// Any running session is stopped first.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        if self.state.current_session.is_some() {
            let _ = self.dispatch(Action::StopSession);
        }
        self.store.clear()?;
        self.state = FocusState::default();
        tracing::info!("stored focus data cleared");
        Ok(())
    }

    /// Create a task from a focus intent, make it current and start a quick
    /// session on it.
    pub fn quick_start(&mut self, intent: &str) -> Result<Vec<Event>> {
        if let Some(running) = self.state.session_type.filter(|_| self.state.is_active) {
            return Err(crate::focus::TransitionError::SessionAlreadyActive(running).into());
        }
        let task = Task::new(intent)?;
        let mut events = self.dispatch(Action::SetCurrentTask(task.clone()))?;
        events.extend(self.dispatch(Action::AddTask(task))?);
        events.extend(self.dispatch(Action::StartSession(SessionType::Quick))?);
        Ok(events)
    }

    /// Run the current session in the foreground until it completes or
    /// `shutdown` resolves.
    ///
    /// `observe` sees the state and the events after every processed tick.
    /// On shutdown the session is stopped and not recorded. Must be awaited
    /// inside a tokio runtime; ticks every [`DEFAULT_TICK_INTERVAL`] unless
    /// [`Self::with_ticker`] set another cadence.
    pub async fn run_session<F, O>(&mut self, shutdown: F, mut observe: O) -> Result<SessionOutcome>
    where
        F: Future<Output = ()>,
        O: FnMut(&FocusState, &[Event]),
    {
        if !self.state.is_active {
            return Ok(SessionOutcome::Idle);
        }
        if self.tick_interval.is_none() {
            self.tick_interval = Some(DEFAULT_TICK_INTERVAL);
        }
        if !self.is_ticking() {
            self.restart_ticker();
        }
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = self.tick_rx.recv() => {
                    let Some(signal) = signal else {
                        return Ok(SessionOutcome::Idle);
                    };
                    if signal.generation != self.generation {
                        tracing::trace!(generation = signal.generation, "dropping stale tick");
                        continue;
                    }
                    let events = self.tick()?;
                    observe(&self.state, &events);
                    let completed = events
                        .into_iter()
                        .find(|e| matches!(e, Event::SessionCompleted { .. }));
                    if let Some(event) = completed {
                        return Ok(SessionOutcome::Completed(event));
                    }
                    if !self.state.is_active {
                        return Ok(SessionOutcome::Idle);
                    }
                }
                _ = &mut shutdown => {
                    let events = self.dispatch(Action::StopSession)?;
                    observe(&self.state, &events);
                    return Ok(SessionOutcome::Stopped);
                }
            }
        }
    }

    fn restart_ticker(&mut self) {
        self.cancel_ticker();
        self.generation += 1;
        let Some(interval) = self.tick_interval else {
            return;
        };
        if !self.state.is_active || self.state.time_remaining == 0 {
            return;
        }
        let tx = self.tick_tx.clone();
        let generation = self.generation;
        self.ticker = Some(Ticker::start(interval, move || {
            // The receiver lives as long as the controller.
            let _ = tx.send(TickSignal { generation });
        }));
        tracing::trace!(generation, ?interval, "ticker installed");
    }

    fn cancel_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
            tracing::trace!(generation = self.generation, "ticker cancelled");
        }
    }

    fn complete_expired(&mut self) -> Option<Event> {
        self.cancel_ticker();
        let finished = self.state.session_type;
        match self.state.apply(Action::CompleteSession, Utc::now()) {
            Ok(event) => {
                if let Some(session_type) = finished {
                    self.chime(session_type);
                }
                event
            }
            Err(e) => {
                tracing::warn!("automatic completion failed: {e}");
                None
            }
        }
    }

    fn chime(&self, session_type: SessionType) {
        if !self.state.settings.sound_enabled {
            return;
        }
        if let Err(e) = self.notifier.session_finished(session_type) {
            tracing::warn!("completion sound failed: {e}");
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::SessionStarted {
            session_type,
            duration_secs,
            ..
        } => tracing::info!(%session_type, duration_secs, "session started"),
        Event::SessionCompleted {
            session_type,
            completed_sessions,
            next,
            ..
        } => tracing::info!(%session_type, completed_sessions, %next, "session completed"),
        Event::SessionStopped {
            session_type,
            remaining_secs,
            ..
        } => tracing::info!(?session_type, remaining_secs, "session stopped"),
        Event::SessionExpired { session_type, .. } => {
            tracing::debug!(%session_type, "session expired")
        }
        other => tracing::trace!(?other, "event"),
    }
}
