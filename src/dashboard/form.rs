//! Add/edit dialog over the board

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::board::{parse_calendar_date, ApplicationDraft, ApplicationId, ApplicationRecord, ApplicationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Company,
    Position,
    Date,
    Status,
    Notes,
    JobLink,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Company,
        Field::Position,
        Field::Date,
        Field::Status,
        Field::Notes,
        Field::JobLink,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Company => "Company",
            Field::Position => "Position",
            Field::Date => "Date Applied",
            Field::Status => "Status",
            Field::Notes => "Notes",
            Field::JobLink => "Job Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(ApplicationId),
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Editing,
    Cancelled,
    Submitted,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    company: String,
    position: String,
    date: String,
    status: ApplicationStatus,
    notes: String,
    job_link: String,
    focus: usize,
    pub error: Option<String>,
}

impl FormState {
    /// Empty form for a new application in `status`'s column.
    pub fn add(status: ApplicationStatus, today: NaiveDate) -> Self {
        Self {
            mode: FormMode::Add,
            company: String::new(),
            position: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            status,
            notes: String::new(),
            job_link: String::new(),
            focus: 0,
            error: None,
        }
    }

    pub fn edit(record: &ApplicationRecord) -> Self {
        Self {
            mode: FormMode::Edit(record.id.clone()),
            company: record.company.clone(),
            position: record.position.clone(),
            date: record.date_applied.format("%Y-%m-%d").to_string(),
            status: record.status,
            notes: record.notes.clone().unwrap_or_default(),
            job_link: record.job_link.clone().unwrap_or_default(),
            focus: 0,
            error: None,
        }
    }

    pub fn focus(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Company => &self.company,
            Field::Position => &self.position,
            Field::Date => &self.date,
            Field::Status => self.status.label(),
            Field::Notes => &self.notes,
            Field::JobLink => &self.job_link,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Company => Some(&mut self.company),
            Field::Position => Some(&mut self.position),
            Field::Date => Some(&mut self.date),
            Field::Status => None,
            Field::Notes => Some(&mut self.notes),
            Field::JobLink => Some(&mut self.job_link),
        }
    }

    fn cycle_status(&mut self, delta: isize) {
        let len = ApplicationStatus::ALL.len() as isize;
        let index = (self.status.column_index() as isize + delta).rem_euclid(len) as usize;
        self.status = ApplicationStatus::ALL[index];
    }

    /// Tab/arrows move between fields, Left/Right change the status, Enter
    /// submits and Esc closes the dialog.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        let last = Field::ALL.len() - 1;
        match key.code {
            KeyCode::Esc => return FormInput::Cancelled,
            KeyCode::Enter => return FormInput::Submitted,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1).min(last),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            KeyCode::Left if self.focus() == Field::Status => self.cycle_status(-1),
            KeyCode::Right | KeyCode::Char(' ') if self.focus() == Field::Status => self.cycle_status(1),
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut(self.focus()) {
                    text.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(text) = self.text_mut(self.focus()) {
                    text.push(c);
                }
            }
            _ => {}
        }
        FormInput::Editing
    }

    /// Validated draft, or the message to show in the dialog.
    pub fn draft(&self) -> Result<ApplicationDraft, String> {
        let date = parse_calendar_date(&self.date)
            .ok_or_else(|| format!("Date applied must be YYYY-MM-DD, got '{}'", self.date.trim()))?;

        ApplicationDraft::new(self.company.clone(), self.position.clone(), date)
            .with_status(self.status)
            .with_notes(Some(self.notes.clone()))
            .with_job_link(Some(self.job_link.clone()))
            .validate()
            .map_err(|e| e.to_string())
    }
}

/// Centered dialog drawn over whatever is below it.
pub fn render_form(f: &mut Frame, area: Rect, form: &FormState) {
    let popup = centered(area, 60, 16);
    let title = match &form.mode {
        FormMode::Add => " Add Application ".to_string(),
        FormMode::Edit(id) => format!(" Edit Application #{} ", id),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            let focused = *field == form.focus();
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let value = match field {
                Field::Status => format!("◀ {} ▶", form.value(*field)),
                _ if focused => format!("{}▏", form.value(*field)),
                _ => form.value(*field).to_string(),
            };
            Line::from(vec![
                Span::styled(format!("{:>13}: ", field.label()), label_style),
                Span::styled(value, Style::default().fg(Color::White)),
            ])
        })
        .collect();

    lines.push(Line::raw(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "tab next field · ←→ status · enter save · esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width.min(area.width)),
            Constraint::Fill(1),
        ])
        .split(vertical[1])[1]
}
