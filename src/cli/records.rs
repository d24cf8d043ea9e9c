//! `jobtrack add|edit|move|delete` commands - Change applications

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::api::HttpClient;
use crate::board::{ApplicationDraft, ApplicationId, ApplicationStatus, RecordPatch};
use crate::cli::{connect, print_notifications, LoginArgs};
use crate::tracker::{DragEvent, DropTarget, Tracker};

#[derive(Parser, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Company name
    company: String,

    /// Position title
    position: String,

    /// Date applied (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Starting column
    #[arg(short, long, default_value = "Applied")]
    status: ApplicationStatus,

    #[arg(long)]
    notes: Option<String>,

    /// Link to the job posting
    #[arg(long)]
    link: Option<String>,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Application id
    id: ApplicationId,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    position: Option<String>,

    /// Date applied (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(short, long)]
    status: Option<ApplicationStatus>,

    /// New notes; an empty string clears them
    #[arg(long)]
    notes: Option<String>,

    /// New job link; an empty string clears it
    #[arg(long)]
    link: Option<String>,
}

#[derive(Parser, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Application to move
    id: ApplicationId,

    /// Column to drop it on
    #[arg(required_unless_present = "onto")]
    status: Option<ApplicationStatus>,

    /// Drop it on another application instead, joining that one's column
    #[arg(long, conflicts_with = "status")]
    onto: Option<ApplicationId>,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Application id
    id: ApplicationId,
}

pub async fn add(args: AddArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let mut tracker = connect(args.login, api_url).await?;

    let draft = ApplicationDraft::new(
        args.company,
        args.position,
        args.date.unwrap_or_else(|| Local::now().date_naive()),
    )
    .with_status(args.status)
    .with_notes(args.notes)
    .with_job_link(args.link);

    let result = tracker.add_application(draft).await;
    finish(&mut tracker);
    let id = result.context("Failed to add application")?;
    println!("  id: {}", id);
    Ok(())
}

pub async fn edit(args: EditArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let mut tracker = connect(args.login, api_url).await?;

    let patch = RecordPatch {
        company: args.company,
        position: args.position,
        date_applied: args.date,
        status: args.status,
        notes: args.notes.map(non_blank),
        job_link: args.link.map(non_blank),
    };
    if patch.is_empty() {
        bail!("Nothing to change for application {}", args.id);
    }

    let Some(mut record) = tracker.store().get(&args.id).cloned() else {
        bail!("No application with id {}", args.id);
    };
    patch.apply(&mut record);

    let result = tracker.update_application(record).await;
    finish(&mut tracker);
    result.context("Failed to update application")
}

/// Runs the same drag gesture the board does: pick up, drop, persist.
pub async fn move_card(args: MoveArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let mut tracker = connect(args.login, api_url).await?;

    if tracker.store().get(&args.id).is_none() {
        bail!("No application with id {}", args.id);
    }

    let target = match (args.onto, args.status) {
        (Some(card), _) => DropTarget::Card(card),
        (None, Some(status)) => DropTarget::Column(status),
        (None, None) => bail!("Give a column or --onto"),
    };

    tracker.drag(DragEvent::Start(args.id.clone()));
    let result = tracker.drop_and_persist(DragEvent::End(Some(target))).await;

    match &result {
        Ok(Some(change)) => println!("✓ Moved #{} from {} to {}", change.id, change.from, change.to),
        Ok(None) => println!("Nothing to move: #{} is already there", args.id),
        Err(_) => {}
    }
    finish(&mut tracker);
    result.map(|_| ()).context("Failed to save the new status")
}

pub async fn delete(args: DeleteArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let mut tracker = connect(args.login, api_url).await?;

    let result = tracker.delete_application(&args.id).await;
    finish(&mut tracker);
    result.context("Failed to delete application")
}

fn finish(tracker: &mut Tracker<HttpClient>) {
    print_notifications(tracker.notifications_mut());
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_clears_empty_values() {
        assert_eq!(non_blank("  ".to_string()), None);
        assert_eq!(non_blank(" remote ".to_string()), Some("remote".to_string()));
    }

    #[test]
    fn test_move_args_accept_column_or_card() {
        let args = MoveArgs::try_parse_from([
            "move", "--email", "a@b.c", "--password", "pw", "7", "offer",
        ])
        .unwrap();
        assert_eq!(args.status, Some(ApplicationStatus::Offer));
        assert_eq!(args.onto, None);

        let args = MoveArgs::try_parse_from([
            "move", "--email", "a@b.c", "--password", "pw", "7", "--onto", "9",
        ])
        .unwrap();
        assert_eq!(args.onto, Some(ApplicationId::from("9")));

        assert!(MoveArgs::try_parse_from(["move", "--email", "a@b.c", "--password", "pw", "7"]).is_err());
    }
}
