//! User-visible notifications (toasts)

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ApiError;

/// Title used for every failed remote call.
pub const FAILURE_TITLE: &str = "Uh oh! Something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ordered log of everything shown to the user during a session.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(Level::Success, title.into(), Some(description.into()));
    }

    pub fn error(&mut self, title: impl Into<String>, description: Option<String>) {
        self.push(Level::Error, title.into(), description);
    }

    /// Surface a failed remote call, preferring the server's own message.
    pub fn failure(&mut self, err: &ApiError) {
        let description = err
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        self.error(FAILURE_TITLE, Some(description));
    }

    fn push(&mut self, level: Level, title: String, description: Option<String>) {
        self.entries.push(Notification {
            level,
            title,
            description,
            created_at: Utc::now(),
        });
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(|n| n.level == Level::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand the pending notifications to the caller, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_prefers_server_message() {
        let mut log = NotificationLog::new();
        log.failure(&ApiError::Status {
            status: 400,
            message: Some("Invalid status".to_string()),
        });
        log.failure(&ApiError::Transport("connection refused".to_string()));

        let errors: Vec<_> = log.errors().collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].title, FAILURE_TITLE);
        assert_eq!(errors[0].description.as_deref(), Some("Invalid status"));
        assert_eq!(
            errors[1].description.as_deref(),
            Some("request failed: connection refused")
        );
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = NotificationLog::new();
        log.success("Saved", "ok");
        assert_eq!(log.latest().map(|n| n.level), Some(Level::Success));
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }
}
