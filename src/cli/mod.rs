//! CLI command handlers

pub mod board;
pub mod list;
pub mod records;
pub mod register;
pub mod stats;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::api::{Credentials, HttpClient};
use crate::config::{find_config_dir, load_config, Config};
use crate::notify::{Level, NotificationLog};
use crate::session;
use crate::tracker::Tracker;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register(register::RegisterArgs),

    /// List applications by column
    List(list::ListArgs),

    /// Add an application
    Add(records::AddArgs),

    /// Edit an application
    Edit(records::EditArgs),

    /// Move an application to another column
    Move(records::MoveArgs),

    /// Delete an application
    Delete(records::DeleteArgs),

    /// Show application analytics
    Stats(stats::StatsArgs),

    /// Open the interactive kanban board
    Board(board::BoardArgs),
}

impl Commands {
    /// Whether the command takes over the terminal while it runs.
    pub fn owns_terminal(&self) -> bool {
        matches!(self, Commands::Board(_))
    }
}

pub async fn handle_command(cmd: Commands, api_url: Option<String>) -> anyhow::Result<()> {
    match cmd {
        Commands::Register(args) => register::execute(args, api_url).await,
        Commands::List(args) => list::execute(args, api_url).await,
        Commands::Add(args) => records::add(args, api_url).await,
        Commands::Edit(args) => records::edit(args, api_url).await,
        Commands::Move(args) => records::move_card(args, api_url).await,
        Commands::Delete(args) => records::delete(args, api_url).await,
        Commands::Stats(args) => stats::execute(args, api_url).await,
        Commands::Board(args) => board::execute(args, api_url).await,
    }
}

/// Account credentials shared by every command that needs a login.
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, env = "JOBTRACK_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl From<LoginArgs> for Credentials {
    fn from(args: LoginArgs) -> Self {
        Credentials {
            email: args.email,
            password: args.password,
        }
    }
}

fn resolve_config(api_url: Option<String>) -> anyhow::Result<Config> {
    let current = std::env::current_dir()?;
    let config = load_config(&find_config_dir(&current))?;
    Ok(config.with_api_url(api_url))
}

fn client(api_url: Option<String>) -> anyhow::Result<HttpClient> {
    let config = resolve_config(api_url)?;
    tracing::debug!(api_url = %config.api_url, "Using API");
    HttpClient::new(config.api_url).context("Failed to build HTTP client")
}

/// Log in and load the board.
async fn connect(login: LoginArgs, api_url: Option<String>) -> anyhow::Result<Tracker<HttpClient>> {
    let api = client(api_url)?;
    let mut notifications = NotificationLog::new();

    let session = match session::login(&api, &login.into(), &mut notifications).await {
        Ok(session) => session,
        Err(err) => {
            print_notifications(&mut notifications);
            return Err(err).context("Login failed");
        }
    };

    let mut tracker = Tracker::new(session, api);
    tracker.refresh().await.context("Failed to fetch applications")?;
    // Successful login and fetch toasts are only interesting in the board.
    tracker.notifications_mut().drain();
    Ok(tracker)
}

/// Print and clear pending notifications, errors to stderr.
fn print_notifications(notifications: &mut NotificationLog) {
    for n in notifications.drain() {
        let line = match &n.description {
            Some(description) => format!("{} {}", n.title, description),
            None => n.title.clone(),
        };
        match n.level {
            Level::Success => println!("\x1b[32m✓\x1b[0m {}", line),
            Level::Error => eprintln!("\x1b[31m✗\x1b[0m {}", line),
        }
    }
}
