//! # guildkeep
//!
//! Console front end for the guild exporter. Runs one configured command
//! (normally `backup`) against one guild and exits.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use guildkeep_bot::commands;
use guildkeep_bot::config::BotConfig;
use guildkeep_platform::{HttpFetcher, RestClient};

fn banner(event: &str) -> String {
    format!("--- BOT {event} AT {} ---", Local::now().format("%a %b %d %Y %-H:%-M:%-S"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,guildkeep_bot=debug,guildkeep=debug")),
        )
        .init();

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {e}");
            return Err(e.into());
        }
    };
    info!("{}", banner("START"));
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Platform client and command registry
    // -----------------------------------------------------------------------
    let source = Arc::new(RestClient::new(config.api_base.clone(), config.token.clone())?);
    let fetcher = Arc::new(HttpFetcher::new()?);
    let registry = commands::registry(source, fetcher, &config);
    info!(commands = ?registry.names(), "Commands registered");

    // -----------------------------------------------------------------------
    // 4. Run the invocation until it finishes or Ctrl+C arrives
    // -----------------------------------------------------------------------
    let invocation = config.console_invocation();
    tokio::select! {
        reply = registry.dispatch(&invocation) => {
            match reply {
                Some(reply) => info!(ephemeral = reply.ephemeral, "{}", reply.content),
                None => warn!(command = %invocation.command, "Unknown command, nothing to do"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("{}", banner("END"));
        }
    }

    Ok(())
}
