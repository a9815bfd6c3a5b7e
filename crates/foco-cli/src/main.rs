use clap::{Parser, Subcommand};
use foco_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "foco", version, about = "Focus timer with a distraction block list")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a quick session on a new task
    Start {
        /// What you are about to focus on
        intent: String,
    },
    /// Session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Session settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Blocked-site list
    Block {
        #[command(subcommand)]
        action: commands::block::BlockAction,
    },
    /// Focus statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        #[command(subcommand)]
        action: Option<commands::stats::StatsAction>,
    },
    /// Application configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("FOCO_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config);
    if let Err(e) = loaded {
        tracing::warn!("using default configuration: {e}");
    }

    let result = match cli.command {
        Commands::Start { intent } => commands::session::quick_start(&config, &intent),
        Commands::Session { action } => commands::session::run(&config, action),
        Commands::Task { action } => commands::task::run(&config, action),
        Commands::Settings { action } => commands::settings::run(&config, action),
        Commands::Block { action } => commands::block::run(&config, action),
        Commands::Stats { json, action } => commands::stats::run(&config, json, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
