//! `jobtrack list` command - List applications by column

use clap::Parser;

use crate::board::{ApplicationRecord, ApplicationStatus};
use crate::cli::{connect, LoginArgs};

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Show only one column
    #[arg(short, long)]
    status: Option<ApplicationStatus>,

    /// Show notes and job links
    #[arg(short, long)]
    details: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: ListArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let tracker = connect(args.login, api_url).await?;
    let store = tracker.store();

    if args.json {
        let records: Vec<&ApplicationRecord> = store
            .records()
            .iter()
            .filter(|r| args.status.map_or(true, |s| r.status == s))
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("📋 Applications for {}\n", tracker.session().display_name());

    for column in store.columns() {
        if args.status.is_some_and(|s| s != column.status) {
            continue;
        }

        println!("{} {} ({})", column_symbol(column.status), column.status, column.len());
        for record in &column.records {
            print_record(record, args.details);
        }
        println!();
    }

    let counts: Vec<String> = store
        .columns()
        .iter()
        .map(|c| format!("{} {}", c.len(), c.status.label().to_lowercase()))
        .collect();
    println!("Summary: {}", counts.join(", "));

    Ok(())
}

fn column_symbol(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Applied => "\x1b[34m●\x1b[0m",
        ApplicationStatus::Interview => "\x1b[33m●\x1b[0m",
        ApplicationStatus::Offer => "\x1b[32m●\x1b[0m",
        ApplicationStatus::Rejected => "\x1b[31m●\x1b[0m",
    }
}

fn print_record(record: &ApplicationRecord, details: bool) {
    println!(
        "  \x1b[2m#{:<4}\x1b[0m {} \x1b[2mat\x1b[0m {} \x1b[2m({})\x1b[0m",
        record.id.as_str(), record.position, record.company, record.date_applied
    );

    if details {
        if let Some(notes) = &record.notes {
            println!("      └─ {}", notes);
        }
        if let Some(link) = &record.job_link {
            println!("      └─ 🔗 {}", link);
        }
    }
}
