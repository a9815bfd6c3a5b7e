pub mod block;
pub mod completions;
pub mod config;
pub mod session;
pub mod settings;
pub mod stats;
pub mod task;

use foco_core::{
    Action, AppConfig, BellNotifier, Database, FocusController, SilentNotifier, SqliteStore, Task,
};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the controller over the configured database.
pub fn open_controller(
    config: &AppConfig,
) -> Result<FocusController<SqliteStore>, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    let store = SqliteStore::new(Database::open(&path)?);
    let controller = FocusController::new(store);
    Ok(if config.bell {
        controller.with_notifier(BellNotifier)
    } else {
        controller.with_notifier(SilentNotifier)
    })
}

/// Resolve a task by full id or unique id prefix.
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task, String> {
    if let Some(task) = tasks.iter().find(|t| t.id == id) {
        return Ok(task);
    }
    let mut matches = tasks.iter().filter(|t| t.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(task), None) if !id.is_empty() => Ok(task),
        (Some(_), Some(_)) => Err(format!("task id '{id}' is ambiguous")),
        _ => Err(format!("task '{id}' not found")),
    }
}

/// Apply one action and report nothing but failures.
pub fn apply(controller: &mut FocusController<SqliteStore>, action: Action) -> CmdResult {
    controller.dispatch(action)?;
    controller.persist()?;
    Ok(())
}

/// First eight characters of an id, enough to type back.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
