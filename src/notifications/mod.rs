//! Notification store - bounded, time-limited toast records
//!
//! Translates OCS events into user-facing notifications independent of any
//! single view's lifetime. The list is process-wide shared state, mutated
//! only through add/remove/clear.

mod expiry;
mod store;
mod types;

pub use store::NotificationStore;
pub use types::{Notification, NotificationKind};

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::events::OcsEvent;

static STORE: Lazy<Arc<NotificationStore>> = Lazy::new(|| Arc::new(NotificationStore::new()));

/// The process-wide notification store
pub fn store() -> Arc<NotificationStore> {
    STORE.clone()
}

/// Materialize a notification for an inbound event and schedule its expiry
pub(crate) fn record_event(event: &OcsEvent) -> Notification {
    let notification = STORE.add_event(event);
    expiry::schedule(STORE.clone(), notification.id);
    notification
}

/// Live notifications, newest first
pub fn live() -> Vec<Notification> {
    STORE.live()
}

/// Dismiss a notification by id (no-op if already gone)
pub fn remove(id: u64) -> bool {
    STORE.remove(id)
}

/// Dismiss everything at once
pub fn clear() {
    STORE.clear()
}
