//! Drag interaction controller
//!
//! A two-state machine (`Idle` / `Dragging`) fed by discrete gesture events.
//! Dropping a card resolves to a status change that is applied to the board
//! immediately; persisting it is the caller's job (see
//! [`Tracker::persist_status_change`](super::Tracker::persist_status_change)).

use std::fmt;

use tracing::{debug, info};

use crate::board::{ApplicationId, ApplicationRecord, ApplicationStatus, BoardStore, RecordPatch, COLUMN_PREFIX};

/// Where a dragged card was released or is hovering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(ApplicationStatus),
    Card(ApplicationId),
}

impl DropTarget {
    /// Interpret a toolkit drop-target id: `column-<Status>` is a column,
    /// anything else names a card.
    pub fn parse(raw: &str) -> Self {
        raw.strip_prefix(COLUMN_PREFIX)
            .and_then(|status| status.parse().ok())
            .map(DropTarget::Column)
            .unwrap_or_else(|| DropTarget::Card(ApplicationId::new(raw)))
    }

    fn is_card(&self, id: &ApplicationId) -> bool {
        matches!(self, DropTarget::Card(card) if card == id)
    }
}

/// Same form [`DropTarget::parse`] reads: `column-<Status>` or the card id.
impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropTarget::Column(status) => f.write_str(&status.column_id()),
            DropTarget::Card(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start(ApplicationId),
    Move(Option<DropTarget>),
    End(Option<DropTarget>),
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: ApplicationId,
        over: Option<DropTarget>,
    },
}

/// A status mutation committed to the board by a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: ApplicationId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    /// The record as it stands after the change.
    pub record: ApplicationRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Event made no sense in the current state.
    Ignored,
    Started,
    Hovering,
    /// Drag finished without touching the board.
    Dropped,
    Moved(StatusChange),
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active(&self) -> Option<&ApplicationId> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn hovering(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Advance the state machine. Drops are resolved and applied to `store`
    /// before this returns; the controller is back in `Idle` afterwards.
    pub fn handle(&mut self, event: DragEvent, store: &mut BoardStore) -> DragOutcome {
        match event {
            DragEvent::Start(active) => {
                debug!(id = %active, "Drag started");
                self.state = DragState::Dragging { active, over: None };
                DragOutcome::Started
            }
            DragEvent::Move(target) => match &mut self.state {
                DragState::Dragging { over, .. } => {
                    if let Some(target) = &target {
                        debug!(over = %target, "Hovering");
                    }
                    *over = target;
                    DragOutcome::Hovering
                }
                DragState::Idle => DragOutcome::Ignored,
            },
            DragEvent::End(target) => match std::mem::take(&mut self.state) {
                DragState::Dragging { active, .. } => Self::drop_onto(&active, target, store),
                DragState::Idle => DragOutcome::Ignored,
            },
            DragEvent::Cancel => match std::mem::take(&mut self.state) {
                DragState::Dragging { active, .. } => {
                    debug!(id = %active, "Drag cancelled");
                    DragOutcome::Dropped
                }
                DragState::Idle => DragOutcome::Ignored,
            },
        }
    }

    fn drop_onto(active: &ApplicationId, target: Option<DropTarget>, store: &mut BoardStore) -> DragOutcome {
        let Some(target) = target else {
            return DragOutcome::Dropped;
        };
        debug!(id = %active, onto = %target, "Dropped");
        if target.is_card(active) {
            return DragOutcome::Dropped;
        }

        let Some(from) = store.get(active).map(|record| record.status) else {
            debug!(id = %active, "Dragged record no longer on the board");
            return DragOutcome::Dropped;
        };

        let to = match &target {
            DropTarget::Column(status) => *status,
            DropTarget::Card(over) => match store.get(over) {
                Some(record) => record.status,
                None => {
                    debug!(id = %over, "Drop target record no longer on the board");
                    return DragOutcome::Dropped;
                }
            },
        };

        if to == from {
            return DragOutcome::Dropped;
        }

        match store.update(active, &RecordPatch::status(to)) {
            Some(record) => {
                info!(id = %active, %from, %to, "Moved application");
                DragOutcome::Moved(StatusChange {
                    id: active.clone(),
                    from,
                    to,
                    record: record.clone(),
                })
            }
            None => DragOutcome::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, status: ApplicationStatus) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::from(id),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            date_applied: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            status,
            notes: None,
            job_link: None,
        }
    }

    fn board() -> BoardStore {
        BoardStore::with_records(vec![
            record("A", ApplicationStatus::Applied),
            record("B", ApplicationStatus::Offer),
            record("C", ApplicationStatus::Applied),
        ])
    }

    fn drag(controller: &mut DragController, store: &mut BoardStore, id: &str, target: Option<DropTarget>) -> DragOutcome {
        controller.handle(DragEvent::Start(ApplicationId::from(id)), store);
        controller.handle(DragEvent::End(target), store)
    }

    fn status_of(store: &BoardStore, id: &str) -> ApplicationStatus {
        store.get(&ApplicationId::from(id)).unwrap().status
    }

    #[test]
    fn test_parse_drop_target() {
        assert_eq!(
            DropTarget::parse("column-Interview"),
            DropTarget::Column(ApplicationStatus::Interview)
        );
        assert_eq!(DropTarget::parse("42"), DropTarget::Card(ApplicationId::from("42")));
        assert_eq!(
            DropTarget::parse("column-Ghosted"),
            DropTarget::Card(ApplicationId::from("column-Ghosted"))
        );
    }

    #[test]
    fn test_drop_target_display_matches_parse() {
        let column = DropTarget::Column(ApplicationStatus::Offer);
        assert_eq!(column.to_string(), "column-Offer");
        assert_eq!(DropTarget::parse(&column.to_string()), column);
        assert_eq!(DropTarget::Card(ApplicationId::from("7")).to_string(), "7");
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut store = board();
        let mut controller = DragController::new();

        assert_eq!(controller.handle(DragEvent::Move(None), &mut store), DragOutcome::Ignored);
        assert_eq!(controller.handle(DragEvent::End(None), &mut store), DragOutcome::Ignored);

        controller.handle(DragEvent::Start(ApplicationId::from("A")), &mut store);
        assert_eq!(controller.active(), Some(&ApplicationId::from("A")));

        let over = DropTarget::Column(ApplicationStatus::Offer);
        assert_eq!(
            controller.handle(DragEvent::Move(Some(over.clone())), &mut store),
            DragOutcome::Hovering
        );
        assert_eq!(controller.hovering(), Some(&over));

        assert_eq!(controller.handle(DragEvent::Cancel, &mut store), DragOutcome::Dropped);
        assert_eq!(controller.state(), &DragState::Idle);
        assert_eq!(status_of(&store, "A"), ApplicationStatus::Applied);
    }

    #[test]
    fn test_drop_on_column_sets_status() {
        let mut store = board();
        let mut controller = DragController::new();

        let outcome = drag(&mut controller, &mut store, "A", Some(DropTarget::Column(ApplicationStatus::Interview)));

        match outcome {
            DragOutcome::Moved(change) => {
                assert_eq!(change.from, ApplicationStatus::Applied);
                assert_eq!(change.to, ApplicationStatus::Interview);
                assert_eq!(change.record.status, ApplicationStatus::Interview);
            }
            other => panic!("expected a move, got {:?}", other),
        }
        assert_eq!(status_of(&store, "A"), ApplicationStatus::Interview);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_on_card_takes_its_status() {
        let mut store = board();
        let mut controller = DragController::new();

        drag(&mut controller, &mut store, "A", Some(DropTarget::Card(ApplicationId::from("B"))));

        assert_eq!(status_of(&store, "A"), ApplicationStatus::Offer);
        assert_eq!(store.position(&ApplicationId::from("A")), Some(0));
    }

    #[test]
    fn test_drop_on_own_column_is_noop() {
        let mut store = board();
        let before = store.records().to_vec();
        let mut controller = DragController::new();

        let outcome = drag(&mut controller, &mut store, "A", Some(DropTarget::Column(ApplicationStatus::Applied)));
        assert_eq!(outcome, DragOutcome::Dropped);

        let outcome = drag(&mut controller, &mut store, "A", Some(DropTarget::Card(ApplicationId::from("C"))));
        assert_eq!(outcome, DragOutcome::Dropped);

        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn test_drop_on_self_or_nothing_is_noop() {
        let mut store = board();
        let mut controller = DragController::new();

        assert_eq!(
            drag(&mut controller, &mut store, "A", Some(DropTarget::Card(ApplicationId::from("A")))),
            DragOutcome::Dropped
        );
        assert_eq!(drag(&mut controller, &mut store, "A", None), DragOutcome::Dropped);
        assert_eq!(status_of(&store, "A"), ApplicationStatus::Applied);
    }

    #[test]
    fn test_missing_records_are_noops() {
        let mut store = board();
        let mut controller = DragController::new();

        assert_eq!(
            drag(&mut controller, &mut store, "ghost", Some(DropTarget::Column(ApplicationStatus::Offer))),
            DragOutcome::Dropped
        );
        assert_eq!(
            drag(&mut controller, &mut store, "A", Some(DropTarget::Card(ApplicationId::from("gone")))),
            DragOutcome::Dropped
        );
        assert_eq!(status_of(&store, "A"), ApplicationStatus::Applied);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_restart_replaces_active_record() {
        let mut store = board();
        let mut controller = DragController::new();

        controller.handle(DragEvent::Start(ApplicationId::from("A")), &mut store);
        controller.handle(DragEvent::Start(ApplicationId::from("C")), &mut store);
        controller.handle(
            DragEvent::End(Some(DropTarget::Column(ApplicationStatus::Rejected))),
            &mut store,
        );

        assert_eq!(status_of(&store, "A"), ApplicationStatus::Applied);
        assert_eq!(status_of(&store, "C"), ApplicationStatus::Rejected);
    }
}
