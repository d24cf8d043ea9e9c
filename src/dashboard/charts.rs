//! Analytics view

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use super::board::status_color;
use crate::stats::{Analytics, NamedCount};

pub fn render_analytics(f: &mut Frame, area: Rect, analytics: &Analytics) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Summary cards
            Constraint::Min(8),    // Status + timeline
            Constraint::Min(8),    // Companies + positions
        ])
        .split(area);

    render_summary(f, rows[0], analytics);

    let middle = halves(rows[1]);
    render_status_chart(f, middle[0], analytics);
    render_timeline(f, middle[1], analytics);

    let bottom = halves(rows[2]);
    render_ranking(f, bottom[0], "Top Companies", &analytics.top_companies, Color::LightRed);
    render_ranking(f, bottom[1], "Position Types", &analytics.position_types, Color::LightBlue);
}

fn halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn render_summary(f: &mut Frame, area: Rect, analytics: &Analytics) {
    let s = &analytics.summary;
    let cards = [
        ("Total Applications", format!("{}", s.total), format!("{} active applications", s.active)),
        (
            "Interview Rate",
            format!("{}%", s.interview_rate),
            format!("{} interviews from {} applications", s.interviews, s.total),
        ),
        (
            "Success Rate",
            format!("{}%", s.success_rate),
            format!("{} offers from {} applications", s.offers, s.total),
        ),
        (
            "Rejection Rate",
            format!("{}%", s.rejection_rate),
            format!("{} rejections from {} applications", s.rejected, s.total),
        ),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value, caption), chunk) in cards.into_iter().zip(chunks.iter()) {
        let body = vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(caption, Style::default().fg(Color::Gray))),
        ];
        let card = Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(card, *chunk);
    }
}

fn render_status_chart(f: &mut Frame, area: Rect, analytics: &Analytics) {
    let bars: Vec<Bar> = analytics
        .by_status
        .iter()
        .map(|entry| {
            Bar::default()
                .label(Line::from(entry.status.label()))
                .value(entry.count as u64)
                .style(Style::default().fg(status_color(entry.status)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Application Status"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2);
    f.render_widget(chart, area);
}

fn render_timeline(f: &mut Frame, area: Rect, analytics: &Analytics) {
    let bars: Vec<Bar> = analytics
        .timeline
        .iter()
        .map(|day| {
            Bar::default()
                .label(Line::from(day.label.clone()))
                .value(day.count as u64)
                .style(Style::default().fg(Color::LightGreen))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Application Timeline"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1);
    f.render_widget(chart, area);
}

fn render_ranking(f: &mut Frame, area: Rect, title: &str, entries: &[NamedCount], color: Color) {
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0).max(1);
    let width = 20usize;

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let filled = entry.count * width / max;
            Line::from(vec![
                Span::styled(format!("{:<16.16} ", entry.name), Style::default().fg(Color::White)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::styled(format!(" {}", entry.count), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let ranking = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(ranking, area);
}
