//! Foreground sessions.
//!
//! A session only lives as long as the `foco` process: the countdown runs in
//! the terminal and Ctrl-C stops it without recording anything.

use std::io::Write;

use clap::Subcommand;
use foco_core::stats::{format_clock, format_hours_minutes};
use foco_core::{
    Action, AppConfig, Event, FocusController, FocusState, SessionOutcome, SessionType,
    SqliteStore,
};

use super::{find_task, open_controller, short_id, CmdResult};

/// kv key holding the task id picked with `foco task current`.
pub const CURRENT_TASK_KEY: &str = "cli_current_task";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session and count it down
    Start {
        /// quick, focus, short-break, long-break, or break for whichever
        /// break is due
        kind: String,
        /// Task to credit (id or id prefix); defaults to the current task
        #[arg(long)]
        task: Option<String>,
    },
    /// Show counters and what comes next
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(config: &AppConfig, action: SessionAction) -> CmdResult {
    match action {
        SessionAction::Start { kind, task } => start(config, &kind, task.as_deref()),
        SessionAction::Status { json } => status(config, json),
    }
}

/// `foco start <intent>`.
pub fn quick_start(config: &AppConfig, intent: &str) -> CmdResult {
    runtime()?.block_on(quick_start_async(config, intent))
}

async fn quick_start_async(config: &AppConfig, intent: &str) -> CmdResult {
    let mut controller = open_controller(config)?.with_ticker(config.tick_interval());
    let events = controller.quick_start(intent)?;
    if let Some(task) = &controller.state().current_task {
        controller
            .store()
            .database()
            .kv_set(CURRENT_TASK_KEY, &task.id)?;
    }
    foreground(&mut controller, events).await
}

fn start(config: &AppConfig, kind: &str, task: Option<&str>) -> CmdResult {
    runtime()?.block_on(start_async(config, kind, task))
}

async fn start_async(config: &AppConfig, kind: &str, task: Option<&str>) -> CmdResult {
    let mut controller = open_controller(config)?.with_ticker(config.tick_interval());
    let session_type = if kind.eq_ignore_ascii_case("break") {
        controller.state().next_break()
    } else {
        kind.parse::<SessionType>()?
    };

    let task_id = match task {
        Some(id) => Some(id.to_string()),
        None => controller.store().database().kv_get(CURRENT_TASK_KEY)?,
    };
    if let Some(id) = task_id {
        match find_task(&controller.state().tasks, &id).cloned() {
            Ok(found) => {
                controller.dispatch(Action::SetCurrentTask(found))?;
            }
            // An explicit --task must exist; a stale stored pick is ignored.
            Err(e) if task.is_some() => return Err(e.into()),
            Err(_) => tracing::debug!("stored current task '{id}' no longer exists"),
        }
    }

    let events = controller.dispatch(Action::StartSession(session_type))?;
    foreground(&mut controller, events).await
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::debug!("interrupt received");
}

async fn foreground(
    controller: &mut FocusController<SqliteStore>,
    started: Vec<Event>,
) -> CmdResult {
    for event in &started {
        report(controller.state(), event);
    }
    if started
        .iter()
        .any(|e| matches!(e, Event::SessionCompleted { .. }))
    {
        return Ok(());
    }

    let label = controller
        .state()
        .session_type
        .map(SessionType::label)
        .unwrap_or("Session");
    draw(label, controller.state());

    let outcome = controller
        .run_session(shutdown_signal(), |state, _| draw(label, state))
        .await?;
    eprintln!();

    match outcome {
        SessionOutcome::Completed(event) => report(controller.state(), &event),
        SessionOutcome::Stopped => println!("{label} stopped, nothing recorded"),
        SessionOutcome::Idle => {}
    }
    controller.persist()?;
    Ok(())
}

fn draw(label: &str, state: &FocusState) {
    let task = state
        .current_task
        .as_ref()
        .map(|t| format!(" - {}", t.title))
        .unwrap_or_default();
    let mut err = std::io::stderr();
    let _ = write!(
        err,
        "\r{label}{task}  {}  ",
        format_clock(state.time_remaining)
    );
    let _ = err.flush();
}

fn report(state: &FocusState, event: &Event) {
    match event {
        Event::SessionStarted {
            session_type,
            duration_secs,
            ..
        } => println!(
            "{} started ({})",
            session_type.label(),
            format_clock(*duration_secs)
        ),
        Event::SessionCompleted {
            session_type,
            completed_sessions,
            next,
            ..
        } => {
            println!("{} complete", session_type.label());
            if *session_type == SessionType::Focus {
                println!("Focus sessions completed: {completed_sessions}");
            }
            if let Some(task) = &state.current_task {
                println!(
                    "{}: {} focused",
                    task.title,
                    format_hours_minutes(task.focus_time)
                );
            }
            println!("Next up: {} (foco session start {next})", next.label());
        }
        _ => {}
    }
}

fn status(config: &AppConfig, json: bool) -> CmdResult {
    let controller = open_controller(config)?;
    let state = controller.state();
    let current = controller
        .store()
        .database()
        .kv_get(CURRENT_TASK_KEY)?
        .and_then(|id| state.task(&id).cloned());
    let last = state.sessions.last();

    if json {
        let value = serde_json::json!({
            "completedSessions": state.completed_sessions,
            "nextBreak": state.next_break(),
            "currentTask": current,
            "lastSession": last,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("No session running.");
    println!("Focus sessions completed: {}", state.completed_sessions);
    println!("Next break: {}", state.next_break().label());
    match &current {
        Some(task) => println!("Current task: {} [{}]", task.title, short_id(&task.id)),
        None => println!("Current task: none"),
    }
    if let Some(session) = last {
        println!(
            "Last session: {:?} {} at {}",
            session.kind,
            format_clock(session.duration),
            session.start_time.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
