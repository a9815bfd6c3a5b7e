//! Task management commands for CLI.

use clap::Subcommand;
use foco_core::stats::format_hours_minutes;
use foco_core::{Action, AppConfig, Task};

use super::session::CURRENT_TASK_KEY;
use super::{apply, find_task, open_controller, short_id, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
    },
    /// List tasks
    List {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task as done
    Done {
        /// Task ID or prefix
        id: String,
    },
    /// Rename a task
    Rename {
        /// Task ID or prefix
        id: String,
        /// New title
        title: String,
    },
    /// Delete a task
    Rm {
        /// Task ID or prefix
        id: String,
    },
    /// Pick the task future sessions are credited to
    Current {
        /// Task ID or prefix; omit to show the current pick
        id: Option<String>,
        /// Clear the current pick
        #[arg(long, conflicts_with = "id")]
        clear: bool,
    },
}

pub fn run(config: &AppConfig, action: TaskAction) -> CmdResult {
    let mut controller = open_controller(config)?;

    match action {
        TaskAction::Add { title } => {
            let task = Task::new(&title)?;
            let id = task.id.clone();
            apply(&mut controller, Action::AddTask(task))?;
            println!("Task added: {id}");
        }
        TaskAction::List { all, json } => {
            let tasks: Vec<&Task> = controller
                .state()
                .tasks
                .iter()
                .filter(|t| all || !t.completed)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                let current = controller.store().database().kv_get(CURRENT_TASK_KEY)?;
                for task in tasks {
                    let marker = if current.as_deref() == Some(task.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    let check = if task.completed { "x" } else { " " };
                    println!(
                        "{marker} [{check}] {}  {}  ({})",
                        short_id(&task.id),
                        task.title,
                        format_hours_minutes(task.focus_time)
                    );
                }
            }
        }
        TaskAction::Done { id } => {
            let task = find_task(&controller.state().tasks, &id)?.clone();
            let title = task.title.clone();
            apply(&mut controller, Action::UpdateTask(task.mark_completed()))?;
            println!("Done: {title}");
        }
        TaskAction::Rename { id, title } => {
            let task = find_task(&controller.state().tasks, &id)?.clone();
            let task = task.renamed(&title)?;
            apply(&mut controller, Action::UpdateTask(task))?;
            println!("ok");
        }
        TaskAction::Rm { id } => {
            let task_id = find_task(&controller.state().tasks, &id)?.id.clone();
            apply(&mut controller, Action::DeleteTask(task_id.clone()))?;
            let db = controller.store().database();
            if db.kv_get(CURRENT_TASK_KEY)?.as_deref() == Some(task_id.as_str()) {
                db.kv_delete(CURRENT_TASK_KEY)?;
            }
            println!("Task deleted: {task_id}");
        }
        TaskAction::Current { id, clear } => {
            let db = controller.store().database();
            if clear {
                db.kv_delete(CURRENT_TASK_KEY)?;
                println!("ok");
            } else if let Some(id) = id {
                let task = find_task(&controller.state().tasks, &id)?;
                db.kv_set(CURRENT_TASK_KEY, &task.id)?;
                println!("Current task: {}", task.title);
            } else {
                let current = db
                    .kv_get(CURRENT_TASK_KEY)?
                    .and_then(|id| controller.state().task(&id).cloned());
                match current {
                    Some(task) => println!("{}  {}", short_id(&task.id), task.title),
                    None => println!("none"),
                }
            }
        }
    }
    Ok(())
}
