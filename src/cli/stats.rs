//! `jobtrack stats` command - Show application analytics

use clap::Parser;

use crate::cli::{connect, LoginArgs};
use crate::stats::{Analytics, NamedCount};

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    login: LoginArgs,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: StatsArgs, api_url: Option<String>) -> anyhow::Result<()> {
    let tracker = connect(args.login, api_url).await?;
    let analytics = Analytics::compute(tracker.store().records());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    let s = &analytics.summary;
    println!("📊 Application Dashboard\n");
    println!("  Total:      {} ({} active)", s.total, s.active);
    println!("  Interviews: {} ({}%)", s.interviews, s.interview_rate);
    println!("  Offers:     {} ({}%)", s.offers, s.success_rate);
    println!("  Rejected:   {} ({}%)", s.rejected, s.rejection_rate);
    println!();

    println!("  By status:");
    for entry in &analytics.by_status {
        print_bar(entry.status.label(), entry.count, s.total);
    }

    if !analytics.timeline.is_empty() {
        println!("\n  Timeline:");
        let max = analytics.timeline.iter().map(|d| d.count).max().unwrap_or(0);
        for day in &analytics.timeline {
            print_bar(&day.label, day.count, max);
        }
    }

    print_ranking("Top companies", &analytics.top_companies);
    print_ranking("Position types", &analytics.position_types);

    Ok(())
}

fn print_ranking(title: &str, entries: &[NamedCount]) {
    if entries.is_empty() {
        return;
    }
    println!("\n  {}:", title);
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    for entry in entries {
        print_bar(&entry.name, entry.count, max);
    }
}

fn print_bar(label: &str, count: usize, max: usize) {
    let bar_len = 30;
    let filled = if max == 0 { 0 } else { count * bar_len / max };
    let empty = bar_len - filled;

    println!(
        "    {:<16.16} [{}{}] {}",
        label,
        "█".repeat(filled),
        "░".repeat(empty),
        count
    );
}
