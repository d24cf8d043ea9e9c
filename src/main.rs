//! jobtrack CLI - Track job applications on a terminal kanban board

use std::fs::File;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "jobtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Base URL of the application API (overrides .jobtrack.toml)
    #[arg(long, global = true, env = "JOBTRACK_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: jobtrack::cli::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = if cli.verbose {
        tracing::level_filters::LevelFilter::DEBUG
    } else {
        tracing::level_filters::LevelFilter::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(env_filter.into())
        .from_env_lossy();

    if cli.command.owns_terminal() {
        // The board draws over stdout; keep log lines out of it.
        let log_path = std::env::temp_dir().join("jobtrack.log");
        let log_file = File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    }

    // Execute command
    jobtrack::cli::handle_command(cli.command, cli.api_url).await?;

    Ok(())
}
