//! `jobtrack board` command - Interactive kanban board

use clap::Parser;

use crate::api::ApplicationApi;
use crate::cli::{connect, LoginArgs};
use crate::dashboard::Dashboard;
use crate::tracker::{RollbackOnFailure, Tracker};

#[derive(Parser, Debug)]
pub struct BoardArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Put a card back in its old column when saving a drag fails
    #[arg(long)]
    rollback: bool,
}

pub async fn execute(args: BoardArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let rollback = args.rollback;
    let mut tracker = with_drop_policy(connect(args.login, api_url).await?, rollback);

    let result = {
        let mut dashboard = Dashboard::new()?;
        dashboard.run(&mut tracker).await
    };

    // Terminal is restored by now; repeat anything that went wrong during the session.
    let notifications = tracker.close();
    for n in notifications.errors() {
        eprintln!(
            "\x1b[31m✗\x1b[0m {} {}",
            n.title,
            n.description.as_deref().unwrap_or_default()
        );
    }
    result
}

/// Pick what happens to a card whose drop the server refused.
fn with_drop_policy<A: ApplicationApi>(tracker: Tracker<A>, rollback: bool) -> Tracker<A> {
    if rollback {
        tracker.with_reconcile_policy(RollbackOnFailure)
    } else {
        tracker
    }
}
