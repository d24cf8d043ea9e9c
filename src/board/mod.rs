//! Application records and the in-memory board that owns them

pub mod form;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use form::{ApplicationDraft, ValidationError};
pub use store::{BoardChange, BoardStore, Column, SubscriptionId};

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Server-assigned record identifier.
///
/// The API hands ids out as either JSON strings or integers; both are kept
/// as their textual form so comparisons behave the same either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl FromStr for ApplicationId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_int(deserializer).map(Self)
    }
}

/// Accepts `"42"` or `42` and yields `"42"`.
pub(crate) fn string_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(n) => n.to_string(),
    })
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
}

/// Prefix carried by column drop-target identifiers (`column-Offer`).
pub const COLUMN_PREFIX: &str = "column-";

impl ApplicationStatus {
    /// All statuses in board display order.
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Position of this status's column on the board.
    pub fn column_index(&self) -> usize {
        match self {
            ApplicationStatus::Applied => 0,
            ApplicationStatus::Interview => 1,
            ApplicationStatus::Offer => 2,
            ApplicationStatus::Rejected => 3,
        }
    }

    pub fn column_id(&self) -> String {
        format!("{}{}", COLUMN_PREFIX, self.label())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected Applied, Interview, Offer or Rejected)")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One tracked job or internship application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub company: String,
    pub position: String,
    #[serde(alias = "dateApplied", deserialize_with = "calendar_date")]
    pub date_applied: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "blank_as_none", serialize_with = "empty_if_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        alias = "jobLink",
        deserialize_with = "blank_as_none",
        serialize_with = "empty_if_none"
    )]
    pub job_link: Option<String>,
}

impl ApplicationRecord {
    /// Copy of this record carrying a different status.
    pub fn with_status(&self, status: ApplicationStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Partial update merged into an existing record by [`BoardStore::update`].
///
/// `notes` and `job_link` are doubly optional: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<Option<String>>,
    pub job_link: Option<Option<String>>,
}

impl RecordPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, record: &mut ApplicationRecord) {
        if let Some(company) = &self.company {
            record.company = company.clone();
        }
        if let Some(position) = &self.position {
            record.position = position.clone();
        }
        if let Some(date) = self.date_applied {
            record.date_applied = date;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(link) = &self.job_link {
            record.job_link = link.clone();
        }
    }
}

/// Full replacement expressed as a patch (form edits send every field).
impl From<&ApplicationRecord> for RecordPatch {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            company: Some(record.company.clone()),
            position: Some(record.position.clone()),
            date_applied: Some(record.date_applied),
            status: Some(record.status),
            notes: Some(record.notes.clone()),
            job_link: Some(record.job_link.clone()),
        }
    }
}

/// Parses `YYYY-MM-DD`, falling back to the date part of an RFC 3339 timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn calendar_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date '{}'", raw)))
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Optional text goes out as `""` rather than being left out, so a cleared
/// field overwrites the server's copy.
pub(crate) fn empty_if_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_string_or_integer() {
        let text: ApplicationId = serde_json::from_value(json!("abc")).unwrap();
        let number: ApplicationId = serde_json::from_value(json!(17)).unwrap();
        assert_eq!(text.as_str(), "abc");
        assert_eq!(number, ApplicationId::from("17"));
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("interview".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Interview);
        assert_eq!(" Offer ".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Offer);
        assert!("Ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_column_id() {
        assert_eq!(ApplicationStatus::Rejected.column_id(), "column-Rejected");
        for (i, status) in ApplicationStatus::ALL.iter().enumerate() {
            assert_eq!(status.column_index(), i);
        }
    }

    #[test]
    fn test_record_decodes_wire_shape() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "id": 2,
            "company": "TechCorp",
            "position": "Full Stack Engineer",
            "date_applied": "2023-05-03T00:00:00.000Z",
            "status": "Interview",
            "notes": "First interview next week",
            "job_link": ""
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "2");
        assert_eq!(record.date_applied, NaiveDate::from_ymd_opt(2023, 5, 3).unwrap());
        assert_eq!(record.status, ApplicationStatus::Interview);
        assert_eq!(record.job_link, None);
    }

    #[test]
    fn test_record_accepts_camel_case_aliases() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "id": "1",
            "company": "Acme Inc",
            "position": "Frontend Developer",
            "dateApplied": "2023-05-01",
            "status": "Applied",
            "jobLink": "https://acme.com"
        }))
        .unwrap();

        assert_eq!(record.notes, None);
        assert_eq!(record.job_link.as_deref(), Some("https://acme.com"));
    }

    #[test]
    fn test_record_rejects_invalid_date() {
        let result = serde_json::from_value::<ApplicationRecord>(json!({
            "id": "1",
            "company": "Acme Inc",
            "position": "Developer",
            "date_applied": "2023-02-30",
            "status": "Applied"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_clears_optional_fields() {
        let mut record: ApplicationRecord = serde_json::from_value(json!({
            "id": "1",
            "company": "Acme Inc",
            "position": "Developer",
            "date_applied": "2023-05-01",
            "status": "Applied",
            "notes": "call back"
        }))
        .unwrap();

        let patch = RecordPatch {
            notes: Some(None),
            status: Some(ApplicationStatus::Offer),
            ..RecordPatch::default()
        };
        patch.apply(&mut record);

        assert_eq!(record.notes, None);
        assert_eq!(record.status, ApplicationStatus::Offer);
        assert_eq!(record.company, "Acme Inc");
    }
}
