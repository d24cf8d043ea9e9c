//! What to do with an optimistic drop when the server rejects it

use tracing::{info, warn};

use super::drag::StatusChange;
use crate::board::{BoardStore, RecordPatch};

pub trait ReconcilePolicy {
    fn on_persist_failure(&self, store: &mut BoardStore, change: &StatusChange);
}

/// Leave the optimistic status in place. The board stays out of sync with
/// the server until the next full refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOptimistic;

impl ReconcilePolicy for KeepOptimistic {
    fn on_persist_failure(&self, _store: &mut BoardStore, change: &StatusChange) {
        warn!(
            id = %change.id,
            status = %change.to,
            "Status change not persisted; board diverges from server until refresh"
        );
    }
}

/// Put the previous status back, unless something else has changed the
/// record since the drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackOnFailure;

impl ReconcilePolicy for RollbackOnFailure {
    fn on_persist_failure(&self, store: &mut BoardStore, change: &StatusChange) {
        let still_optimistic = store
            .get(&change.id)
            .is_some_and(|record| record.status == change.to);

        if still_optimistic {
            store.update(&change.id, &RecordPatch::status(change.from));
            info!(id = %change.id, status = %change.from, "Rolled back status change");
        }
    }
}
