// src/bin/cli.rs

//! Event Digest CLI
//!
//! Scrapes the configured events listing and posts the upcoming events to a
//! chat webhook. Meant to be run once a day from cron or a CI schedule.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use event_digest::{error::Result, models::Config, pipeline};

/// Event Digest - daily upcoming-events notifier
#[derive(Parser, Debug)]
#[command(
    name = "event-digest",
    version,
    about = "Posts upcoming events from a listing page to a chat webhook"
)]
struct Cli {
    /// Path to the TOML configuration file (optional)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Webhook URL; overrides SLACK_WEBHOOK_URL / WEBHOOK_URL
    #[arg(long, global = true)]
    webhook_url: Option<String>,

    /// Days after today to include (today is always included)
    #[arg(long, global = true)]
    days: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape, filter and post the digest (default)
    Run,

    /// Print the digest without posting it
    Preview {
        /// Print the filtered events as JSON instead of the message
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve configuration: file, then environment, then command-line flags.
fn load_config(cli: &Cli) -> Config {
    let mut config = Config::load_or_default(&cli.config);
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(url) = &cli.webhook_url {
        config.notifier.webhook_url = Some(url.clone());
    }
    if let Some(days) = cli.days {
        config.filter.days_ahead = days;
    }
    config
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli);
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            if let Err(e) = pipeline::run_digest(&config, Utc::now()).await {
                log::error!("Failed to send notification: {}", e);
                return Err(e);
            }
            log::info!("Done!");
        }

        Command::Preview { json } => {
            let digest = pipeline::preview_digest(&config, Utc::now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&digest.events)?);
            } else {
                println!("{}", digest.message);
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("    Listing: {}", config.source.base_url);
            log::info!(
                "    Window: today + {} day(s), undated events {}",
                config.filter.days_ahead,
                if config.filter.include_undated {
                    "included"
                } else {
                    "excluded"
                }
            );
            match config.notifier.webhook_url() {
                Ok(_) => log::info!("    Webhook: configured"),
                Err(e) => log::warn!("    Webhook: {}", e),
            }
        }
    }

    Ok(())
}
