//! Kanban board rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::input::Cursor;
use crate::board::{ApplicationRecord, ApplicationStatus, BoardStore};
use crate::tracker::{DragController, DropTarget};

pub fn status_color(status: ApplicationStatus) -> Color {
    match status {
        ApplicationStatus::Applied => Color::Blue,
        ApplicationStatus::Interview => Color::Yellow,
        ApplicationStatus::Offer => Color::Green,
        ApplicationStatus::Rejected => Color::Red,
    }
}

pub fn render_board(f: &mut Frame, area: Rect, store: &BoardStore, drag: &DragController, cursor: &Cursor) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (column, chunk) in store.columns().into_iter().zip(columns.iter()) {
        let status = column.status;
        let focused = cursor.status() == status;
        let hovered = match drag.hovering() {
            Some(DropTarget::Column(over)) => *over == status,
            Some(DropTarget::Card(id)) => column.records.iter().any(|r| &r.id == id),
            None => false,
        };

        let border_style = if hovered {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = Line::from(vec![
            Span::styled("● ", Style::default().fg(status_color(status))),
            Span::styled(status.label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" ({})", column.len()), Style::default().fg(Color::Gray)),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(if hovered { BorderType::Double } else { BorderType::Rounded })
            .border_style(border_style);

        let items: Vec<ListItem> = column
            .records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let selected = focused && cursor.row == Some(row);
                let carried = drag.active() == Some(&record.id);
                card(record, selected, carried)
            })
            .collect();

        f.render_widget(List::new(items).block(block), *chunk);
    }
}

fn card(record: &ApplicationRecord, selected: bool, carried: bool) -> ListItem<'static> {
    let mut title_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.bg(Color::DarkGray);
    }
    if carried {
        title_style = title_style.fg(Color::Magenta).add_modifier(Modifier::ITALIC);
    }

    let marker = if carried { "✥ " } else if selected { "▶ " } else { "  " };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Magenta)),
            Span::styled(record.position.clone(), title_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(record.company.clone(), Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("📅 {}", record.date_applied.format("%Y-%m-%d")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                if record.job_link.is_some() { "  🔗" } else { "" },
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    if let Some(notes) = &record.notes {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(truncate(notes, 60), Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines.push(Line::raw(""));

    ListItem::new(lines)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Details of the card under the cursor, shown under the board.
pub fn render_details(f: &mut Frame, area: Rect, record: Option<&ApplicationRecord>) {
    let lines = match record {
        Some(r) => vec![
            Line::from(vec![
                Span::styled(format!("#{} ", r.id), Style::default().fg(Color::DarkGray)),
                Span::styled(r.position.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" at "),
                Span::styled(r.company.clone(), Style::default().fg(status_color(r.status))),
            ]),
            Line::from(Span::styled(
                r.job_link.clone().unwrap_or_default(),
                Style::default().fg(Color::Blue),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "No application selected",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let details = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    f.render_widget(details, area);
}
