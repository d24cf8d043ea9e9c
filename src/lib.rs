//! jobtrack - Track job and internship applications on a kanban board
//!
//! Applications live on a remote REST API. After login they are loaded into
//! an in-memory board grouped by status, moved between columns by drag
//! gestures, and changed through add/edit/delete handlers that keep the
//! server and the board in step.

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod session;
pub mod stats;
pub mod tracker;

// Re-export commonly used types
pub use api::{ApiError, ApplicationApi, HttpClient};
pub use board::{ApplicationId, ApplicationRecord, ApplicationStatus, BoardStore};
pub use config::Config;
pub use session::UserSession;
pub use tracker::{DragEvent, DropTarget, Tracker};
