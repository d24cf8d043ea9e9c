//! Application form input and its validation

use chrono::NaiveDate;
use serde::Serialize;

use super::{empty_if_none, ApplicationId, ApplicationRecord, ApplicationStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
}

/// A record as entered in the add/edit form, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDraft {
    pub company: String,
    pub position: String,
    pub date_applied: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(serialize_with = "empty_if_none")]
    pub notes: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub job_link: Option<String>,
}

impl ApplicationDraft {
    pub fn new(company: impl Into<String>, position: impl Into<String>, date_applied: NaiveDate) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            date_applied,
            status: ApplicationStatus::Applied,
            notes: None,
            job_link: None,
        }
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_job_link(mut self, job_link: Option<String>) -> Self {
        self.job_link = job_link;
        self
    }

    /// Trim text fields, turn blank optionals into `None`, and reject blank
    /// required fields.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.company = self.company.trim().to_string();
        self.position = self.position.trim().to_string();
        self.notes = normalize(self.notes);
        self.job_link = normalize(self.job_link);

        if self.company.is_empty() {
            return Err(ValidationError::Required("company"));
        }
        if self.position.is_empty() {
            return Err(ValidationError::Required("position"));
        }
        Ok(self)
    }

    pub fn into_record(self, id: ApplicationId) -> ApplicationRecord {
        ApplicationRecord {
            id,
            company: self.company,
            position: self.position,
            date_applied: self.date_applied,
            status: self.status,
            notes: self.notes,
            job_link: self.job_link,
        }
    }
}

impl From<&ApplicationRecord> for ApplicationDraft {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            company: record.company.clone(),
            position: record.position.clone(),
            date_applied: record.date_applied,
            status: record.status,
            notes: record.notes.clone(),
            job_link: record.job_link.clone(),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
