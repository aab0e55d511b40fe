//! linjevakt CLI
//!
//! Polls one page for linjebok updates and reports changes. All behavior is
//! configured through environment variables (or a `.env` file in the working
//! directory); the subcommands only choose how many cycles run.

use std::time::Duration;

use clap::{Parser, Subcommand};
use linjevakt::{
    config::{Config, WatchMode},
    error::Result,
    state::{ChangeListState, DateState, StateStore},
    watch::{self, ChangeListWatcher, DateWatcher, Watcher},
};

/// linjevakt - page update watcher
#[derive(Parser, Debug)]
#[command(
    name = "linjevakt",
    version,
    about = "Watches the Trafikverket linjebok pages for updates"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll forever at the configured interval (the default)
    Run,

    /// Run a single check cycle and exit
    Once,

    /// Show the configured watch and the stored state without fetching
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            log_banner(&config);
            let poll_interval = Duration::from_secs(config.watch.poll_seconds);
            let mut watcher = build_watcher(&config).await?;
            watch::run_watch_loop(watcher.as_mut(), poll_interval).await?;
        }

        Command::Once => {
            log_banner(&config);
            let mut watcher = build_watcher(&config).await?;
            watch::run_once(watcher.as_mut()).await?;
        }

        Command::Info => {
            show_info(&config).await;
        }
    }

    Ok(())
}

fn log_banner(config: &Config) {
    log::info!("Watching: {}", config.watch.target_url);
    log::info!("Mode: {}", config.watch.mode.as_str());
    log::info!("State file: {}", config.watch.state_file.display());
    log::info!("Interval: {} seconds", config.watch.poll_seconds);
}

async fn build_watcher(config: &Config) -> Result<Box<dyn Watcher>> {
    Ok(match config.watch.mode {
        WatchMode::UpdatedDate => Box::new(DateWatcher::new(config).await?),
        WatchMode::ChangeList => Box::new(ChangeListWatcher::new(config).await?),
    })
}

async fn show_info(config: &Config) {
    let store = StateStore::new(&config.watch.state_file);

    log::info!("Mode: {}", config.watch.mode.as_str());
    log::info!("Target: {}", config.watch.target_url);
    log::info!("State file: {}", config.watch.state_file.display());

    match config.watch.mode {
        WatchMode::UpdatedDate => match store.load::<DateState>().await {
            Some(state) => {
                log::info!(
                    "Last seen updated date: {}",
                    state.last_seen_updated_date.as_deref().unwrap_or("none")
                );
                log::info!(
                    "Previous seen date: {}",
                    state
                        .previous_seen_updated_date
                        .as_deref()
                        .unwrap_or("none")
                );
            }
            None => log::info!("No state recorded yet."),
        },

        WatchMode::ChangeList => match store.load::<ChangeListState>().await {
            Some(state) => {
                log::info!(
                    "{} stored entries, newest: {}",
                    state.last_seen_changes.len(),
                    state
                        .last_seen_changes
                        .first()
                        .map(String::as_str)
                        .unwrap_or("(none)")
                );
            }
            None => log::info!("No state recorded yet."),
        },
    }
}
