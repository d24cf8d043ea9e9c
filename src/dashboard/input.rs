//! Keyboard input: key mapping and the board cursor

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::board::{ApplicationId, ApplicationRecord, ApplicationStatus, BoardStore};
use crate::tracker::DropTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleView,
    Refresh,
    Delete,
    /// Open the form for a new card in the cursor's column.
    Add,
    Edit,
    Left,
    Right,
    Up,
    Down,
    /// Pick up the selected card, or drop the one being carried.
    Grab,
    Cancel,
}

/// Ctrl-C quits from anywhere, including the form.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Translate a key press. Escape cancels a drag in progress instead of quitting.
pub fn action_for(key: KeyEvent, dragging: bool) -> Option<Action> {
    if is_interrupt(&key) {
        return Some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Esc if dragging => Action::Cancel,
        KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab => Action::ToggleView,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('a') => Action::Add,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Char(' ') | KeyCode::Enter => Action::Grab,
        _ => return None,
    };
    Some(action)
}

/// Column and card under the cursor. `row == None` points at the column
/// itself rather than any card in it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub column: usize,
    pub row: Option<usize>,
}

impl Cursor {
    pub fn status(&self) -> ApplicationStatus {
        ApplicationStatus::ALL[self.column.min(ApplicationStatus::ALL.len() - 1)]
    }

    /// Move across columns. While carrying a card the cursor lands on the
    /// column itself; otherwise it selects the nearest card.
    pub fn horizontal(&mut self, delta: isize, store: &BoardStore, dragging: bool) {
        let last = ApplicationStatus::ALL.len() as isize - 1;
        self.column = (self.column as isize + delta).clamp(0, last) as usize;
        self.row = if dragging { None } else { self.row.or(Some(0)) };
        self.clamp(store);
    }

    pub fn vertical(&mut self, delta: isize, store: &BoardStore, dragging: bool) {
        let len = store.by_status(self.status()).count();
        self.row = match self.row {
            None if delta > 0 && len > 0 => Some(0),
            None => None,
            Some(0) if delta < 0 && dragging => None,
            Some(row) => Some((row as isize + delta).clamp(0, len.saturating_sub(1) as isize) as usize),
        };
        self.clamp(store);
    }

    /// Keep the row inside the column after the board changes.
    pub fn clamp(&mut self, store: &BoardStore) {
        let len = store.by_status(self.status()).count();
        self.row = match self.row {
            Some(_) if len == 0 => None,
            Some(row) => Some(row.min(len - 1)),
            None => None,
        };
    }

    /// Point the cursor at the card with `id`, wherever it is.
    pub fn follow(&mut self, store: &BoardStore, id: &ApplicationId) {
        if let Some(record) = store.get(id) {
            self.column = record.status.column_index();
            self.row = store.by_status(record.status).position(|r| &r.id == id);
        }
    }

    pub fn selected<'a>(&self, store: &'a BoardStore) -> Option<&'a ApplicationRecord> {
        let row = self.row?;
        store.by_status(self.status()).nth(row)
    }

    /// Drop target under the cursor.
    pub fn target(&self, store: &BoardStore) -> DropTarget {
        match self.selected(store) {
            Some(record) => DropTarget::Card(record.id.clone()),
            None => DropTarget::Column(self.status()),
        }
    }
}
