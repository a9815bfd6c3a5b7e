use chrono::Local;
use clap::Subcommand;
use foco_core::stats::format_hours_minutes;
use foco_core::{AppConfig, FocusStats};

use super::session::CURRENT_TASK_KEY;
use super::{open_controller, CmdResult};

/// Width of the longest bar in the weekly chart.
const BAR_WIDTH: u64 = 30;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Delete all tasks, sessions and settings
    Reset {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(config: &AppConfig, json: bool, action: Option<StatsAction>) -> CmdResult {
    let mut controller = open_controller(config)?;

    if let Some(StatsAction::Reset { yes }) = action {
        if !yes {
            return Err("this deletes all focus data; re-run with --yes".into());
        }
        controller.reset()?;
        controller
            .store()
            .database()
            .kv_delete(CURRENT_TASK_KEY)?;
        println!("all focus data cleared");
        return Ok(());
    }

    let state = controller.state();
    let stats = FocusStats::compute(&state.sessions, Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Today:        {}", format_hours_minutes(stats.today_focus_secs));
    println!("Total:        {}", format_hours_minutes(stats.total_focus_secs));
    println!("Sessions:     {}", stats.focus_sessions);
    println!("Streak:       {} day(s)", stats.streak_days);
    println!("Tasks:        {}", state.tasks.len());
    println!();

    let max = stats.weekly_max_minutes();
    for day in &stats.last_seven_days {
        let bar = "#".repeat((day.minutes * BAR_WIDTH / max) as usize);
        println!("{}  {bar:<30} {}m", day.date.format("%a %m-%d"), day.minutes);
    }
    Ok(())
}
