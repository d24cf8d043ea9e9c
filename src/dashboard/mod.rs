//! Terminal UI: the kanban board and the analytics view
//!
//! Cards are "dragged" with the keyboard: space picks the selected card up,
//! the arrow keys move it over columns or other cards, and space drops it.
//! Escape cancels.
//!
//! Requests to the server run as spawned tasks and report back over a
//! channel, so the board keeps taking input while they are in flight.

pub mod board;
pub mod charts;
pub mod form;
pub mod input;

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ApiError, ApplicationApi};
use crate::board::{ApplicationDraft, ApplicationId, ApplicationRecord};
use crate::notify::{Level, Notification};
use crate::stats::Analytics;
use crate::tracker::{DragEvent, DragOutcome, StatusChange, Tracker};
use self::form::{render_form, FormInput, FormMode, FormState};
use self::input::{action_for, is_interrupt, Action, Cursor};

const INPUT_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Board,
    Analytics,
}

impl View {
    pub fn toggle(&self) -> Self {
        match self {
            View::Board => View::Analytics,
            View::Analytics => View::Board,
        }
    }
}

/// An API handle that can be moved into a spawned request.
pub trait SharedApi: ApplicationApi + Clone + Send + Sync + 'static {}

impl<T: ApplicationApi + Clone + Send + Sync + 'static> SharedApi for T {}

/// A finished request, waiting to be applied to the board.
#[derive(Debug)]
enum Completion {
    Persisted {
        change: StatusChange,
        result: Result<ApplicationRecord, ApiError>,
    },
    Refreshed(Result<Vec<ApplicationRecord>, ApiError>),
    Deleted {
        id: ApplicationId,
        result: Result<(), ApiError>,
    },
    Created {
        draft: ApplicationDraft,
        result: Result<ApplicationRecord, ApiError>,
    },
    Updated {
        record: ApplicationRecord,
        result: Result<ApplicationRecord, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Raw mode and the alternate screen, undone on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            crossterm::cursor::Show
        );
    }
}

/// Full-screen board for one tracker session
pub struct Dashboard<B: Backend> {
    terminal: Terminal<B>,
    view: View,
    cursor: Cursor,
    form: Option<FormState>,
    dirty: Arc<AtomicBool>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    pending: usize,
    // Dropped last so the terminal is restored after the final frame.
    _guard: Option<TerminalGuard>,
}

impl Dashboard<CrosstermBackend<io::Stdout>> {
    /// Take over the terminal
    pub fn new() -> Result<Self> {
        let guard = TerminalGuard::enter()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let mut dashboard = Self::with_terminal(terminal);
        dashboard._guard = Some(guard);
        Ok(dashboard)
    }
}

impl<B: Backend> Dashboard<B> {
    pub fn with_terminal(terminal: Terminal<B>) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        Self {
            terminal,
            view: View::default(),
            cursor: Cursor { column: 0, row: Some(0) },
            form: None,
            dirty: Arc::new(AtomicBool::new(true)),
            completions_tx,
            completions,
            pending: 0,
            _guard: None,
        }
    }

    /// Run until the user quits
    pub async fn run<A: SharedApi>(&mut self, tracker: &mut Tracker<A>) -> Result<()> {
        let dirty = Arc::clone(&self.dirty);
        let subscription = tracker.subscribe(move |_| dirty.store(true, Ordering::Relaxed));

        let result = self.event_loop(tracker, spawn_input_reader()).await;

        tracker.unsubscribe(subscription);
        result
    }

    async fn event_loop<A: SharedApi>(
        &mut self,
        tracker: &mut Tracker<A>,
        mut input: mpsc::Receiver<io::Result<Event>>,
    ) -> Result<()> {
        loop {
            if self.dirty.swap(false, Ordering::Relaxed) {
                self.cursor.clamp(tracker.store());
                self.draw(tracker)?;
            }

            tokio::select! {
                event = input.recv() => {
                    let Some(event) = event else {
                        return Ok(());
                    };
                    match event? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key, tracker)? == Flow::Quit {
                                if self.pending > 0 {
                                    debug!(pending = self.pending, "Leaving with requests in flight");
                                }
                                return Ok(());
                            }
                        }
                        Event::Resize(_, _) => self.dirty.store(true, Ordering::Relaxed),
                        _ => {}
                    }
                }
                Some(completion) = self.completions.recv() => self.apply(completion, tracker),
            }
        }
    }

    fn handle_key<A: SharedApi>(&mut self, key: KeyEvent, tracker: &mut Tracker<A>) -> Result<Flow> {
        self.dirty.store(true, Ordering::Relaxed);

        if let Some(form) = self.form.as_mut() {
            if is_interrupt(&key) {
                return Ok(Flow::Quit);
            }
            match form.handle_key(key) {
                FormInput::Editing => {}
                FormInput::Cancelled => self.form = None,
                FormInput::Submitted => self.submit_form(tracker),
            }
            return Ok(Flow::Continue);
        }

        let dragging = tracker.drag_controller().is_dragging();
        match action_for(key, dragging) {
            Some(action) => self.handle_action(action, tracker),
            None => Ok(Flow::Continue),
        }
    }

    fn handle_action<A: SharedApi>(&mut self, action: Action, tracker: &mut Tracker<A>) -> Result<Flow> {
        let dragging = tracker.drag_controller().is_dragging();
        let on_board = self.view == View::Board;

        match action {
            Action::Quit => {
                if dragging {
                    tracker.drag(DragEvent::Cancel);
                }
                return Ok(Flow::Quit);
            }
            Action::ToggleView => self.view = self.view.toggle(),
            Action::Refresh => {
                let api = tracker.api().clone();
                let user_id = tracker.session().user_id().clone();
                self.spawn_request(async move {
                    Completion::Refreshed(api.list_applications(&user_id).await)
                });
            }
            Action::Delete if !dragging && on_board => {
                if let Some(id) = self.cursor.selected(tracker.store()).map(|r| r.id.clone()) {
                    let api = tracker.api().clone();
                    self.spawn_request(async move {
                        let result = api.delete_application(&id).await;
                        Completion::Deleted { id, result }
                    });
                }
            }
            Action::Add if !dragging && on_board => {
                self.form = Some(FormState::add(self.cursor.status(), Local::now().date_naive()));
            }
            Action::Edit if !dragging && on_board => {
                self.form = self.cursor.selected(tracker.store()).map(FormState::edit);
            }
            Action::Left | Action::Right | Action::Up | Action::Down if on_board => {
                self.move_cursor(action, tracker, dragging);
            }
            Action::Grab if on_board => self.grab(tracker)?,
            Action::Cancel => {
                tracker.drag(DragEvent::Cancel);
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn move_cursor<A: ApplicationApi>(&mut self, action: Action, tracker: &mut Tracker<A>, dragging: bool) {
        let store = tracker.store();
        match action {
            Action::Left => self.cursor.horizontal(-1, store, dragging),
            Action::Right => self.cursor.horizontal(1, store, dragging),
            Action::Up => self.cursor.vertical(-1, store, dragging),
            Action::Down => self.cursor.vertical(1, store, dragging),
            _ => return,
        }

        if dragging {
            let target = self.cursor.target(tracker.store());
            tracker.drag(DragEvent::Move(Some(target)));
        }
    }

    /// Pick up the selected card, or drop the carried one under the cursor.
    fn grab<A: SharedApi>(&mut self, tracker: &mut Tracker<A>) -> Result<()> {
        if !tracker.drag_controller().is_dragging() {
            if let Some(id) = self.cursor.selected(tracker.store()).map(|r| r.id.clone()) {
                tracker.drag(DragEvent::Start(id));
            }
            return Ok(());
        }

        let target = self.cursor.target(tracker.store());
        if let DragOutcome::Moved(change) = tracker.drag(DragEvent::End(Some(target))) {
            self.cursor.follow(tracker.store(), &change.id);
            // Show the optimistic board before the request goes out.
            self.draw(tracker)?;

            let api = tracker.api().clone();
            self.spawn_request(async move {
                let result = api.update_application(&change.id, &change.record).await;
                Completion::Persisted { change, result }
            });
        }
        Ok(())
    }

    /// Send the form's draft, or leave the form open with the reason it
    /// was refused.
    fn submit_form<A: SharedApi>(&mut self, tracker: &Tracker<A>) {
        let Some(mut form) = self.form.take() else {
            return;
        };
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(message) => {
                form.error = Some(message);
                self.form = Some(form);
                return;
            }
        };

        let api = tracker.api().clone();
        match form.mode {
            FormMode::Add => {
                let user_id = tracker.session().user_id().clone();
                self.spawn_request(async move {
                    let result = api.create_application(&user_id, &draft).await;
                    Completion::Created { draft, result }
                });
            }
            FormMode::Edit(id) => {
                let record = draft.into_record(id);
                self.spawn_request(async move {
                    let result = api.update_application(&record.id, &record).await;
                    Completion::Updated { record, result }
                });
            }
        }
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            // Nobody is listening once the dashboard has closed.
            let _ = tx.send(request.await);
        });
    }

    /// Hand a finished request to the tracker. Answers are applied in the
    /// order they arrive.
    fn apply<A: ApplicationApi>(&mut self, completion: Completion, tracker: &mut Tracker<A>) {
        self.pending = self.pending.saturating_sub(1);
        self.dirty.store(true, Ordering::Relaxed);

        let outcome = match completion {
            Completion::Persisted { change, result } => tracker.finish_status_change(&change, result),
            Completion::Refreshed(result) => tracker.finish_refresh(result).map(|_| ()),
            Completion::Deleted { id, result } => tracker.finish_delete(&id, result),
            Completion::Created { draft, result } => match tracker.finish_add(draft, result) {
                Ok(id) => {
                    self.cursor.follow(tracker.store(), &id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Completion::Updated { record, result } => tracker.finish_update(record, result),
        };

        if let Err(e) = outcome {
            debug!(error = %e, "Request failed");
        }
    }

    fn draw<A: ApplicationApi>(&mut self, tracker: &Tracker<A>) -> Result<()> {
        let view = self.view;
        let cursor = self.cursor;
        let pending = self.pending;
        let form = self.form.as_ref();
        self.terminal
            .draw(|f| Self::render(f, view, &cursor, form, pending, tracker))?;
        Ok(())
    }

    fn render<A: ApplicationApi>(
        f: &mut Frame,
        view: View,
        cursor: &Cursor,
        form: Option<&FormState>,
        pending: usize,
        tracker: &Tracker<A>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(10),   // Board or analytics
                Constraint::Length(3), // Details
                Constraint::Length(1), // Toast
                Constraint::Length(1), // Key help
            ])
            .split(f.area());

        Self::render_header(f, chunks[0], view, tracker.session().display_name(), pending);

        let store = tracker.store();
        match view {
            View::Board => {
                board::render_board(f, chunks[1], store, tracker.drag_controller(), cursor);
                board::render_details(f, chunks[2], cursor.selected(store));
            }
            View::Analytics => {
                charts::render_analytics(f, chunks[1], &Analytics::compute(store.records()));
            }
        }

        Self::render_toast(f, chunks[3], tracker.notifications().latest());

        let help = if tracker.drag_controller().is_dragging() {
            "←→↑↓ move card · space drop · esc cancel"
        } else {
            "←→↑↓ select · space pick up · a add · e edit · d delete · r refresh · tab view · q quit"
        };
        f.render_widget(
            Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
            chunks[4],
        );

        if let Some(form) = form {
            render_form(f, f.area(), form);
        }
    }

    fn render_header(f: &mut Frame, area: Rect, view: View, user: &str, pending: usize) {
        let title = match view {
            View::Board => "Application Tracker",
            View::Analytics => "Dashboard",
        };
        let mut spans = vec![
            Span::styled("📋 ", Style::default().fg(Color::Yellow)),
            Span::styled(title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" - {}", user), Style::default().fg(Color::Gray)),
        ];
        if pending > 0 {
            spans.push(Span::styled(format!(" ⟳ {}", pending), Style::default().fg(Color::Yellow)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
    }

    fn render_toast(f: &mut Frame, area: Rect, notification: Option<&Notification>) {
        let Some(n) = notification else {
            return;
        };
        let color = match n.level {
            Level::Success => Color::Green,
            Level::Error => Color::Red,
        };
        let mut spans = vec![Span::styled(n.title.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD))];
        if let Some(description) = &n.description {
            spans.push(Span::styled(format!(" {}", description), Style::default().fg(Color::Gray)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Read terminal events on a blocking thread. The reader stops once the
/// receiver is dropped.
fn spawn_input_reader() -> mpsc::Receiver<io::Result<Event>> {
    let (tx, rx) = mpsc::channel(64);
    tokio::task::spawn_blocking(move || loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => {
                if tx.blocking_send(event::read()).is_err() {
                    break;
                }
            }
            Ok(false) if tx.is_closed() => break,
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                break;
            }
        }
    });
    rx
}
