//! Board state store - the single owner of the record collection for a session

use std::fmt;

use tracing::debug;

use super::{ApplicationId, ApplicationRecord, ApplicationStatus, RecordPatch};

/// What changed in the store, delivered to observers after the change commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardChange {
    Loaded { count: usize },
    Added(ApplicationId),
    Updated(ApplicationId),
    Removed(ApplicationId),
    Cleared,
}

/// Handle returned by [`BoardStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&BoardChange) + Send>;

/// Records sharing one status, in collection order.
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub status: ApplicationStatus,
    pub records: Vec<&'a ApplicationRecord>,
}

impl Column<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Default)]
pub struct BoardStore {
    records: Vec<ApplicationRecord>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Replace the whole collection.
    pub fn load(&mut self, records: Vec<ApplicationRecord>) {
        let count = records.len();
        self.records = records;
        debug!(count, "Board loaded");
        self.notify(BoardChange::Loaded { count });
    }

    /// Append a record. Ids are trusted to be unique.
    pub fn add(&mut self, record: ApplicationRecord) -> &[ApplicationRecord] {
        let id = record.id.clone();
        self.records.push(record);
        self.notify(BoardChange::Added(id));
        &self.records
    }

    /// Merge `patch` into the record with `id`, keeping its position.
    pub fn update(&mut self, id: &ApplicationId, patch: &RecordPatch) -> Option<&ApplicationRecord> {
        let index = self.position(id)?;
        patch.apply(&mut self.records[index]);
        self.notify(BoardChange::Updated(id.clone()));
        self.records.get(index)
    }

    pub fn remove(&mut self, id: &ApplicationId) -> Option<ApplicationRecord> {
        let index = self.position(id)?;
        let removed = self.records.remove(index);
        self.notify(BoardChange::Removed(id.clone()));
        Some(removed)
    }

    /// Drop every record and observer. Used when the session ends.
    pub fn clear(&mut self) {
        self.records.clear();
        self.notify(BoardChange::Cleared);
        self.observers.clear();
    }

    // ------------------------------------------------------------------------
    // Derivations
    // ------------------------------------------------------------------------

    /// Records with `status` in collection order. The iterator is `Clone`, so
    /// it can be restarted without touching the store again.
    pub fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> impl Iterator<Item = &ApplicationRecord> + Clone + '_ {
        self.records.iter().filter(move |record| record.status == status)
    }

    /// One column per status, in display order.
    pub fn columns(&self) -> Vec<Column<'_>> {
        ApplicationStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                records: self.by_status(status).collect(),
            })
            .collect()
    }

    pub fn get(&self, id: &ApplicationId) -> Option<&ApplicationRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn position(&self, id: &ApplicationId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    /// Register an observer. It runs synchronously after every committed
    /// mutation; no-op updates and removals do not notify.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&BoardChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, change: BoardChange) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }
    }
}
