//! Persistence client - the contract with the remote application API
//!
//! The tracker talks to the server only through [`ApplicationApi`]. The
//! production implementation is [`HttpClient`]; tests substitute in-memory
//! fakes. Every call may fail, and callers treat every failure the same way:
//! no retry, no backoff.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::board::{string_or_int, ApplicationDraft, ApplicationId, ApplicationRecord};

pub use http::HttpClient;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable response: connection refused, DNS failure, reset, ...
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The message the server attached to an error response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// AUTH TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_int(deserializer).map(Self)
    }
}

/// The user payload returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

// ============================================================================
// CONTRACT
// ============================================================================

pub trait ApplicationApi {
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn register(&self, registration: &Registration) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn list_applications(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, ApiError>> + Send;

    /// Create a record; the returned record carries the server-assigned id.
    fn create_application(
        &self,
        user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> impl Future<Output = Result<ApplicationRecord, ApiError>> + Send;

    fn update_application(
        &self,
        id: &ApplicationId,
        record: &ApplicationRecord,
    ) -> impl Future<Output = Result<ApplicationRecord, ApiError>> + Send;

    fn delete_application(&self, id: &ApplicationId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

// ============================================================================
// WIRE DECODING
// ============================================================================

/// Response envelope used by every endpoint: `{ "payload": ..., "message": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Turn a list payload into records.
///
/// Anything other than an array yields an empty board; array items that do
/// not decode as records are skipped.
pub fn decode_records(payload: Value) -> Vec<ApplicationRecord> {
    let Value::Array(items) = payload else {
        warn!("Application list payload is not an array, treating as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ApplicationRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed application record");
                None
            }
        })
        .collect()
}
