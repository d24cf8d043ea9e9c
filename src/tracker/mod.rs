//! Tracker session - the board, its drag controller, and the CRUD handlers
//! for one logged-in user
//!
//! The [`Tracker`] owns the [`BoardStore`] for the lifetime of a login. Only
//! the drag controller and the handlers below mutate it. Drops are applied
//! to the board synchronously; the matching server update is sent
//! afterwards and a failure is handed to the configured [`ReconcilePolicy`].

pub mod drag;
pub mod reconcile;

use tracing::{error, info, instrument};

use crate::api::{ApiError, ApplicationApi};
use crate::board::{
    ApplicationDraft, ApplicationId, ApplicationRecord, BoardChange, BoardStore, RecordPatch,
    SubscriptionId, ValidationError,
};
use crate::notify::NotificationLog;
use crate::session::UserSession;

pub use drag::{DragController, DragEvent, DragOutcome, DragState, DropTarget, StatusChange};
pub use reconcile::{KeepOptimistic, ReconcilePolicy, RollbackOnFailure};

const MANAGE_HINT: &str = "You can now manage your applications.";

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid application: {0}")]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Tracker<A> {
    session: UserSession,
    api: A,
    store: BoardStore,
    drag: DragController,
    reconcile: Box<dyn ReconcilePolicy + Send>,
    notifications: NotificationLog,
}

impl<A: ApplicationApi> Tracker<A> {
    pub fn new(session: UserSession, api: A) -> Self {
        Self {
            session,
            api,
            store: BoardStore::new(),
            drag: DragController::new(),
            reconcile: Box::new(KeepOptimistic),
            notifications: NotificationLog::new(),
        }
    }

    pub fn with_reconcile_policy(mut self, policy: impl ReconcilePolicy + Send + 'static) -> Self {
        self.reconcile = Box::new(policy);
        self
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn drag_controller(&self) -> &DragController {
        &self.drag
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationLog {
        &mut self.notifications
    }

    /// Register a board observer (views re-render from here).
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&BoardChange) + Send + 'static,
    {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Replace the board with the server's list.
    #[instrument(skip(self), fields(session = %self.session.id))]
    pub async fn refresh(&mut self) -> Result<usize, ApiError> {
        let result = self.api.list_applications(self.session.user_id()).await;
        self.finish_refresh(result)
    }

    /// Apply the answer to a list request.
    pub fn finish_refresh(&mut self, result: Result<Vec<ApplicationRecord>, ApiError>) -> Result<usize, ApiError> {
        match result {
            Ok(records) => {
                let count = records.len();
                self.store.load(records);
                info!(count, "Fetched applications");
                self.notifications
                    .success("Fetched all applications successfully!", MANAGE_HINT);
                Ok(count)
            }
            Err(err) => Err(self.report("Error fetching applications", err)),
        }
    }

    /// Create a record remotely, then append it locally with its new id.
    #[instrument(skip(self, draft), fields(session = %self.session.id))]
    pub async fn add_application(&mut self, draft: ApplicationDraft) -> Result<ApplicationId, TrackerError> {
        let draft = draft.validate()?;
        let result = self.api.create_application(self.session.user_id(), &draft).await;
        Ok(self.finish_add(draft, result)?)
    }

    /// Apply the answer to a create request for an already validated draft.
    pub fn finish_add(
        &mut self,
        draft: ApplicationDraft,
        result: Result<ApplicationRecord, ApiError>,
    ) -> Result<ApplicationId, ApiError> {
        match result {
            Ok(created) => {
                let id = created.id;
                // Local copy keeps what the user entered; only the id comes from the server.
                self.store.add(draft.into_record(id.clone()));
                info!(id = %id, "Application added");
                self.notifications
                    .success("Application added successfully!", MANAGE_HINT);
                Ok(id)
            }
            Err(err) => Err(self.report("Error adding application", err)),
        }
    }

    /// Save an edited record remotely, then replace it locally.
    #[instrument(skip(self, record), fields(session = %self.session.id, id = %record.id))]
    pub async fn update_application(&mut self, record: ApplicationRecord) -> Result<(), TrackerError> {
        let record = ApplicationDraft::from(&record).validate()?.into_record(record.id);
        let result = self.api.update_application(&record.id, &record).await;
        Ok(self.finish_update(record, result)?)
    }

    /// Apply the answer to an update request for an already validated record.
    pub fn finish_update(
        &mut self,
        record: ApplicationRecord,
        result: Result<ApplicationRecord, ApiError>,
    ) -> Result<(), ApiError> {
        match result {
            Ok(_) => {
                self.store.update(&record.id, &RecordPatch::from(&record));
                info!(id = %record.id, "Application updated");
                self.notifications
                    .success("Application updated successfully!", MANAGE_HINT);
                Ok(())
            }
            Err(err) => Err(self.report("Error updating application", err)),
        }
    }

    /// Delete remotely, then remove locally.
    #[instrument(skip(self), fields(session = %self.session.id))]
    pub async fn delete_application(&mut self, id: &ApplicationId) -> Result<(), ApiError> {
        let result = self.api.delete_application(id).await;
        self.finish_delete(id, result)
    }

    /// Apply the answer to a delete request.
    pub fn finish_delete(&mut self, id: &ApplicationId, result: Result<(), ApiError>) -> Result<(), ApiError> {
        match result {
            Ok(()) => {
                self.store.remove(id);
                info!(id = %id, "Application deleted");
                self.notifications
                    .success("Application deleted successfully!", MANAGE_HINT);
                Ok(())
            }
            Err(err) => Err(self.report("Error deleting application", err)),
        }
    }

    // ========================================================================
    // DRAG AND DROP
    // ========================================================================

    /// Feed a gesture event to the drag controller. A committed drop is
    /// already visible on the board when this returns.
    pub fn drag(&mut self, event: DragEvent) -> DragOutcome {
        self.drag.handle(event, &mut self.store)
    }

    /// Send a dropped card's new status to the server.
    ///
    /// On failure the reconcile policy decides what happens to the board and
    /// the user is notified. There is no retry.
    #[instrument(skip(self, change), fields(session = %self.session.id, id = %change.id))]
    pub async fn persist_status_change(&mut self, change: StatusChange) -> Result<(), ApiError> {
        let result = self.api.update_application(&change.id, &change.record).await;
        self.finish_status_change(&change, result)
    }

    /// Apply the server's answer to a dropped card's update. Responses are
    /// applied in arrival order, so the last one to arrive wins.
    pub fn finish_status_change(
        &mut self,
        change: &StatusChange,
        result: Result<ApplicationRecord, ApiError>,
    ) -> Result<(), ApiError> {
        match result {
            Ok(_) => {
                info!(id = %change.id, status = %change.to, "Status change saved");
                Ok(())
            }
            Err(err) => {
                self.reconcile.on_persist_failure(&mut self.store, change);
                Err(self.report("Error updating status on drag", err))
            }
        }
    }

    /// Finish a drag and persist the result, if it changed anything.
    pub async fn drop_and_persist(&mut self, event: DragEvent) -> Result<Option<StatusChange>, ApiError> {
        match self.drag(event) {
            DragOutcome::Moved(change) => {
                self.persist_status_change(change.clone()).await?;
                Ok(Some(change))
            }
            _ => Ok(None),
        }
    }

    /// End the session: the board and its observers go away with it.
    pub fn close(mut self) -> NotificationLog {
        info!(session = %self.session.id, "Session closed");
        self.store.clear();
        self.notifications
    }

    fn report(&mut self, context: &str, err: ApiError) -> ApiError {
        error!(error = %err, "{}", context);
        self.notifications.failure(&err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::{User, UserId};
    use crate::board::ApplicationStatus;
    use crate::notify::{Level, FAILURE_TITLE};
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn record(id: &str, status: ApplicationStatus) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::from(id),
            company: format!("Company {}", id),
            position: "Frontend Developer".to_string(),
            date_applied: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            status,
            notes: None,
            job_link: None,
        }
    }

    fn session() -> UserSession {
        UserSession::new(User {
            user_id: UserId::new("u-1"),
            name: None,
            email: Some("dina@example.com".to_string()),
        })
    }

    async fn tracker_with(records: Vec<ApplicationRecord>) -> (Tracker<FakeApi>, FakeApi) {
        let api = FakeApi::with_records(records);
        let mut tracker = Tracker::new(session(), api.clone());
        tracker.refresh().await.unwrap();
        (tracker, api)
    }

    fn status_of(tracker: &Tracker<FakeApi>, id: &str) -> ApplicationStatus {
        tracker.store().get(&ApplicationId::from(id)).unwrap().status
    }

    fn start(id: &str) -> DragEvent {
        DragEvent::Start(ApplicationId::from(id))
    }

    fn onto_column(status: ApplicationStatus) -> DragEvent {
        DragEvent::End(Some(DropTarget::Column(status)))
    }

    #[tokio::test]
    async fn test_drop_is_visible_before_request_is_sent() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let api = FakeApi::with_records(vec![record("1", ApplicationStatus::Applied)])
            .with_journal(Arc::clone(&journal));
        let mut tracker = Tracker::new(session(), api);
        tracker.refresh().await.unwrap();

        let sink = Arc::clone(&journal);
        tracker.subscribe(move |change| sink.lock().unwrap().push(format!("board:{:?}", change)));

        tracker.drag(start("1"));
        let change = match tracker.drag(onto_column(ApplicationStatus::Offer)) {
            DragOutcome::Moved(change) => change,
            other => panic!("expected a move, got {:?}", other),
        };
        // Committed before any network activity.
        assert_eq!(tracker.store().records(), &[record("1", ApplicationStatus::Offer)]);

        tracker.persist_status_change(change).await.unwrap();

        let journal = journal.lock().unwrap().clone();
        assert_eq!(
            &journal[1..],
            &[
                "board:Updated(ApplicationId(\"1\"))".to_string(),
                "api:update 1 Offer".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_optimistic_status() {
        let (mut tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        api.fail_with(500, "Database unavailable");

        tracker.drag(start("1"));
        let err = tracker
            .drop_and_persist(onto_column(ApplicationStatus::Offer))
            .await
            .unwrap_err();

        assert_eq!(err.server_message(), Some("Database unavailable"));
        assert_eq!(tracker.store().records(), &[record("1", ApplicationStatus::Offer)]);

        let latest = tracker.notifications().latest().unwrap();
        assert_eq!(latest.level, Level::Error);
        assert_eq!(latest.title, FAILURE_TITLE);
        assert_eq!(latest.description.as_deref(), Some("Database unavailable"));
    }

    #[tokio::test]
    async fn test_rollback_policy_restores_status_on_failure() {
        let (tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        let mut tracker = tracker.with_reconcile_policy(RollbackOnFailure);
        api.fail_with(503, "Try again later");

        tracker.drag(start("1"));
        assert!(tracker
            .drop_and_persist(onto_column(ApplicationStatus::Interview))
            .await
            .is_err());

        assert_eq!(status_of(&tracker, "1"), ApplicationStatus::Applied);
    }

    #[tokio::test]
    async fn test_drop_on_card_persists_target_column_status() {
        let (mut tracker, api) = tracker_with(vec![
            record("A", ApplicationStatus::Applied),
            record("B", ApplicationStatus::Offer),
        ])
        .await;

        tracker.drag(start("A"));
        let change = tracker
            .drop_and_persist(DragEvent::End(Some(DropTarget::Card(ApplicationId::from("B")))))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.to, ApplicationStatus::Offer);
        assert_eq!(status_of(&tracker, "A"), ApplicationStatus::Offer);
        assert_eq!(api.records()[0].status, ApplicationStatus::Offer);
    }

    #[tokio::test]
    async fn test_noop_drop_sends_nothing() {
        let (mut tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;

        tracker.drag(start("1"));
        let result = tracker
            .drop_and_persist(onto_column(ApplicationStatus::Applied))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!api.calls().iter().any(|call| call.starts_with("update")));
    }

    #[tokio::test]
    async fn test_add_appends_with_server_id() {
        let (mut tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        let draft = ApplicationDraft::new(
            "BigTech",
            "Software Engineer",
            NaiveDate::from_ymd_opt(2023, 5, 5).unwrap(),
        );

        let id = tracker.add_application(draft).await.unwrap();

        assert_eq!(id.as_str(), "101");
        assert_eq!(tracker.store().len(), 2);
        assert_eq!(tracker.store().records()[1].company, "BigTech");
        assert_eq!(api.records().len(), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_draft_without_calling_api() {
        let (mut tracker, api) = tracker_with(vec![]).await;
        let draft = ApplicationDraft::new("", "Engineer", NaiveDate::from_ymd_opt(2023, 5, 5).unwrap());

        let err = tracker.add_application(draft).await.unwrap_err();

        assert!(matches!(err, TrackerError::Invalid(ValidationError::Required("company"))));
        assert!(!api.calls().iter().any(|call| call.starts_with("create")));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_board_untouched() {
        let (mut tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        api.fail_with(400, "Invalid payload");

        let mut edited = record("1", ApplicationStatus::Applied);
        edited.company = "Renamed".to_string();
        assert!(tracker.update_application(edited).await.is_err());

        assert_eq!(tracker.store().records()[0].company, "Company 1");
        assert_eq!(tracker.notifications().errors().count(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_record_in_place() {
        let (mut tracker, _api) = tracker_with(vec![
            record("1", ApplicationStatus::Applied),
            record("2", ApplicationStatus::Applied),
        ])
        .await;

        let mut edited = record("1", ApplicationStatus::Interview);
        edited.notes = Some("Phone screen Friday".to_string());
        tracker.update_application(edited).await.unwrap();

        let first = &tracker.store().records()[0];
        assert_eq!(first.id.as_str(), "1");
        assert_eq!(first.status, ApplicationStatus::Interview);
        assert_eq!(first.notes.as_deref(), Some("Phone screen Friday"));
    }

    #[tokio::test]
    async fn test_delete_removes_after_server_confirms() {
        let (mut tracker, api) = tracker_with(vec![
            record("1", ApplicationStatus::Applied),
            record("2", ApplicationStatus::Offer),
        ])
        .await;

        tracker.delete_application(&ApplicationId::from("1")).await.unwrap();
        assert_eq!(tracker.store().len(), 1);

        api.fail_with(500, "boom");
        assert!(tracker.delete_application(&ApplicationId::from("2")).await.is_err());
        assert_eq!(tracker.store().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_current_board() {
        let (mut tracker, api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        api.fail_with(500, "boom");

        assert!(tracker.refresh().await.is_err());
        assert_eq!(tracker.store().len(), 1);
    }

    #[tokio::test]
    async fn test_close_tears_down_board() {
        let (mut tracker, _api) = tracker_with(vec![record("1", ApplicationStatus::Applied)]).await;
        let cleared = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&cleared);
        tracker.subscribe(move |change| {
            if *change == BoardChange::Cleared {
                *flag.lock().unwrap() = true;
            }
        });

        let log = tracker.close();

        assert!(*cleared.lock().unwrap());
        assert_eq!(log.latest().unwrap().level, Level::Success);
    }
}
