//! In-memory API used by unit tests

use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use super::{ApiError, ApplicationApi, Credentials, Registration, User, UserId};
use crate::board::{ApplicationDraft, ApplicationId, ApplicationRecord};

#[derive(Default)]
struct FakeState {
    records: Vec<ApplicationRecord>,
    next_id: u64,
    fail_with: Option<(u16, String)>,
    calls: Vec<String>,
}

/// Records every call in a shared journal and can be switched into a
/// failing mode that answers every request with an error status.
#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    state: Arc<Mutex<FakeState>>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeApi {
    pub fn with_records(records: Vec<ApplicationRecord>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = 100;
            state.records = records;
        }
        api
    }

    /// Share a journal with other observers so call ordering can be asserted.
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Hold each update until `gate` hands out a permit.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_with = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.state.lock().unwrap().records.clone()
    }

    fn enter(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(format!("api:{}", call));
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some((status, message)) = state.fail_with.clone() {
            return Err(ApiError::Status {
                status,
                message: Some(message),
            });
        }
        Ok(state)
    }
}

impl ApplicationApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.enter(format!("login {}", credentials.email))?;
        Ok(User {
            user_id: UserId::new("u-1"),
            name: Some("Test User".to_string()),
            email: Some(credentials.email.clone()),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.enter(format!("register {}", registration.email))?;
        Ok(())
    }

    async fn list_applications(&self, user_id: &UserId) -> Result<Vec<ApplicationRecord>, ApiError> {
        let state = self.enter(format!("list {}", user_id))?;
        Ok(state.records.clone())
    }

    async fn create_application(
        &self,
        _user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> Result<ApplicationRecord, ApiError> {
        let mut state = self.enter(format!("create {}", draft.company))?;
        state.next_id += 1;
        let record = draft.clone().into_record(ApplicationId::new(state.next_id.to_string()));
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        record: &ApplicationRecord,
    ) -> Result<ApplicationRecord, ApiError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let mut state = self.enter(format!("update {} {}", id, record.status))?;
        match state.records.iter_mut().find(|r| &r.id == id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(ApiError::Status {
                status: 404,
                message: Some("Job not found".to_string()),
            }),
        }
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), ApiError> {
        let mut state = self.enter(format!("delete {}", id))?;
        state.records.retain(|r| &r.id != id);
        Ok(())
    }
}
