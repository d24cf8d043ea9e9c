//! Read-only analytics over the application records

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::board::{ApplicationRecord, ApplicationStatus};

/// How many companies / position types the rankings keep.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Everything not rejected.
    pub active: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    pub interview_rate: u32,
    pub success_rate: u32,
    pub rejection_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Short label such as `May 1`.
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub summary: Summary,
    pub by_status: Vec<StatusCount>,
    pub timeline: Vec<DayCount>,
    pub top_companies: Vec<NamedCount>,
    pub position_types: Vec<NamedCount>,
}

impl Analytics {
    pub fn compute(records: &[ApplicationRecord]) -> Self {
        Self {
            summary: summarize(records),
            by_status: status_distribution(records),
            timeline: timeline(records),
            top_companies: top_companies(records),
            position_types: position_types(records),
        }
    }
}

pub fn summarize(records: &[ApplicationRecord]) -> Summary {
    let count = |status: ApplicationStatus| records.iter().filter(|r| r.status == status).count();

    let total = records.len();
    let interviews = count(ApplicationStatus::Interview);
    let offers = count(ApplicationStatus::Offer);
    let rejected = count(ApplicationStatus::Rejected);

    Summary {
        total,
        active: total - rejected,
        interviews,
        offers,
        rejected,
        interview_rate: percent(interviews, total),
        success_rate: percent(offers, total),
        rejection_rate: percent(rejected, total),
    }
}

/// Whole percentage, rounded half up; 0 for an empty set.
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part * 200 + total) / (total * 2)) as u32
}

pub fn status_distribution(records: &[ApplicationRecord]) -> Vec<StatusCount> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: records.iter().filter(|r| r.status == status).count(),
        })
        .collect()
}

/// Applications per calendar day, oldest first.
pub fn timeline(records: &[ApplicationRecord]) -> Vec<DayCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *days.entry(record.date_applied).or_default() += 1;
    }

    days.into_iter()
        .map(|(date, count)| DayCount {
            date,
            label: date.format("%b %-d").to_string(),
            count,
        })
        .collect()
}

pub fn top_companies(records: &[ApplicationRecord]) -> Vec<NamedCount> {
    ranked(records.iter().map(|r| r.company.trim()))
}

/// Rank by the last word of the position ("Frontend Developer" counts as
/// "Developer").
pub fn position_types(records: &[ApplicationRecord]) -> Vec<NamedCount> {
    ranked(
        records
            .iter()
            .filter_map(|r| r.position.split_whitespace().last()),
    )
}

/// Count names, most frequent first. Ties keep first-seen order.
fn ranked<'a>(names: impl Iterator<Item = &'a str>) -> Vec<NamedCount> {
    let mut counts: Vec<NamedCount> = Vec::new();
    for name in names.filter(|n| !n.is_empty()) {
        match counts.iter_mut().find(|c| c.name == name) {
            Some(entry) => entry.count += 1,
            None => counts.push(NamedCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ApplicationId;

    fn record(id: &str, company: &str, position: &str, date: (i32, u32, u32), status: ApplicationStatus) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::from(id),
            company: company.to_string(),
            position: position.to_string(),
            date_applied: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            status,
            notes: None,
            job_link: None,
        }
    }

    fn sample() -> Vec<ApplicationRecord> {
        vec![
            record("1", "Acme Inc", "Frontend Developer", (2023, 5, 1), ApplicationStatus::Applied),
            record("2", "TechCorp", "Full Stack Engineer", (2023, 5, 3), ApplicationStatus::Interview),
            record("3", "DevStartup", "React Developer", (2023, 4, 28), ApplicationStatus::Rejected),
            record("4", "BigTech", "Software Engineer", (2023, 5, 5), ApplicationStatus::Applied),
            record("5", "TechCorp", "Intern", (2023, 5, 3), ApplicationStatus::Offer),
        ]
    }

    #[test]
    fn test_summary_counts_and_rates() {
        let summary = summarize(&sample());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.active, 4);
        assert_eq!(summary.interviews, 1);
        assert_eq!(summary.offers, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.interview_rate, 20);
        assert_eq!(summary.success_rate, 20);
        assert_eq!(summary.rejection_rate, 20);
    }

    #[test]
    fn test_empty_summary_has_zero_rates() {
        assert_eq!(summarize(&[]), Summary::default());
        assert!(Analytics::compute(&[]).timeline.is_empty());
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_status_distribution_lists_every_status() {
        let counts: Vec<usize> = status_distribution(&sample()).iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_timeline_is_chronological() {
        let labels: Vec<(String, usize)> = timeline(&sample())
            .into_iter()
            .map(|day| (day.label, day.count))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Apr 28".to_string(), 1),
                ("May 1".to_string(), 1),
                ("May 3".to_string(), 2),
                ("May 5".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_companies_sorted_with_stable_ties() {
        let names: Vec<(String, usize)> = top_companies(&sample())
            .into_iter()
            .map(|c| (c.name, c.count))
            .collect();
        assert_eq!(names[0], ("TechCorp".to_string(), 2));
        assert_eq!(names[1], ("Acme Inc".to_string(), 1));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_position_types_use_last_word() {
        let types: Vec<(String, usize)> = position_types(&sample())
            .into_iter()
            .map(|c| (c.name, c.count))
            .collect();
        assert_eq!(
            types,
            vec![
                ("Developer".to_string(), 2),
                ("Engineer".to_string(), 2),
                ("Intern".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_rankings_keep_top_five() {
        let records: Vec<_> = (0..8)
            .map(|i| record(&i.to_string(), &format!("Co {}", i), "Dev", (2023, 1, 1), ApplicationStatus::Applied))
            .collect();
        assert_eq!(top_companies(&records).len(), TOP_N);
    }
}
