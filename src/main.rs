use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard::cli::{self, Cli, Commands, ConfigCommands};
use taskboard::config::Config;
use taskboard::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Checking the config must not depend on it loading
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        init_logging(cli.log_level.as_deref().unwrap_or("warn"));
        return cli::cmd_config_check(&cli.config);
    }

    // Load configuration
    let config = Config::load(&cli.config)?.with_overrides(
        cli.api_url.as_deref(),
        cli.session_file.as_deref(),
        cli.log_level.as_deref(),
    );

    init_logging(&config.logging.level);

    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    tracing::debug!(
        base_url = %config.api.base_url,
        session_file = %config.session.path.display(),
        "Starting TaskBoard client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = Arc::new(AppState::new(config).context("Failed to create HTTP client")?);

    cli::run_command(&cli, state).await
}

/// Logs go to stderr so command output stays clean
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
