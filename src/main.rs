use anyhow::{Context, Result};
use clap::Parser;
use ircbot::{config, logging, CommandRegistry, SessionController};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ircbot", version, about = "A minimal IRC bot")]
struct Args {
    /// Config file (`key: value` lines, or TOML if it ends in .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log protocol traffic and state changes
    #[arg(short, long)]
    debug: bool,

    /// Write an example config file and exit
    #[arg(long)]
    write_config: bool,

    /// Start a fresh session this many seconds after the connection is lost
    #[arg(long, value_name = "SECS")]
    reconnect: Option<u64>,
}

/// Commands available to chat users beyond the built-in shutdown.
fn commands() -> CommandRegistry {
    CommandRegistry::new()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    let path = args.config.unwrap_or_else(config::config_path);
    if args.write_config {
        config::write_basic_config(&path)?;
        tracing::info!(path = %path.display(), "wrote example config");
        return Ok(());
    }

    let cfg = config::load_config(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    loop {
        // Terminated sessions are never reused; each attempt gets a fresh
        // controller.
        let mut controller = SessionController::new(cfg.clone(), commands());
        let result = match controller.start().await {
            Ok(()) => controller.run().await,
            Err(e) => Err(e),
        };

        match (result, args.reconnect) {
            (Ok(()), _) => return Ok(()),
            (Err(e), Some(delay)) => {
                tracing::warn!(error = %e, delay_secs = delay, "session ended, reconnecting");
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
            (Err(e), None) => return Err(e).context("IRC session failed"),
        }
    }
}
