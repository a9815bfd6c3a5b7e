//! Blocked-site list. The list is consumed by an external blocking agent;
//! `check` answers the same question that agent asks.

use clap::Subcommand;
use foco_core::{Action, AppConfig};

use super::{apply, open_controller, CmdResult};

#[derive(Subcommand)]
pub enum BlockAction {
    /// Add a site (URL or domain)
    Add { site: String },
    /// Remove a site
    Rm { site: String },
    /// List blocked sites
    List,
    /// Exit non-zero when a URL would be blocked
    Check { url: String },
}

pub fn run(config: &AppConfig, action: BlockAction) -> CmdResult {
    let mut controller = open_controller(config)?;
    let settings = controller.state().settings.clone();

    match action {
        BlockAction::Add { site } => {
            if settings.is_site_listed(&site) {
                println!("already blocked");
                return Ok(());
            }
            let patch = settings.with_blocked_site(&site)?;
            apply(&mut controller, Action::UpdateSettings(patch))?;
            if let Some(added) = controller.state().settings.blocked_sites.last() {
                println!("Blocked: {added}");
            }
        }
        BlockAction::Rm { site } => {
            if !settings.is_site_listed(&site) {
                return Err(format!("'{site}' is not on the block list").into());
            }
            let patch = settings.without_blocked_site(&site)?;
            apply(&mut controller, Action::UpdateSettings(patch))?;
            println!("ok");
        }
        BlockAction::List => {
            if settings.blocked_sites.is_empty() {
                println!("No blocked sites.");
            }
            for site in &settings.blocked_sites {
                println!("{site}");
            }
        }
        BlockAction::Check { url } => {
            if settings.blocks(&url) {
                let context = controller.state().blocked_context();
                println!("blocked");
                if let Some(title) = context.task_title {
                    println!("Stay on: {title}");
                }
                std::process::exit(2);
            }
            println!("allowed");
        }
    }
    Ok(())
}
