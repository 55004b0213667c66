//! Notification types derived from OCS events
//!
//! Notifications are UI-facing, time-bounded records owned exclusively by
//! the notification store. They never round-trip back to the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::OcsEvent;

/// Which kind of event a notification was derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusChanged,
    Created,
    Cancelled,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::StatusChanged => write!(f, "status_changed"),
            NotificationKind::Created => write!(f, "created"),
            NotificationKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<&OcsEvent> for NotificationKind {
    fn from(event: &OcsEvent) -> Self {
        match event {
            OcsEvent::StatusChanged { .. } => NotificationKind::StatusChanged,
            OcsEvent::Created { .. } => NotificationKind::Created,
            OcsEvent::Cancelled { .. } => NotificationKind::Cancelled,
        }
    }
}

/// A live, user-facing notification
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    /// Locally generated id, unique per process
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub ocs_id: String,
    pub ocs_pk: i64,
}

impl Notification {
    /// Project an event into a notification record
    pub fn from_event(id: u64, event: &OcsEvent) -> Self {
        Self {
            id,
            kind: NotificationKind::from(event),
            message: event.message().to_string(),
            timestamp: event.timestamp(),
            ocs_id: event.ocs_id().to_string(),
            ocs_pk: event.ocs_pk(),
        }
    }
}
