/// Bounded, newest-first notification store
///
/// The store core is synchronous and runtime-free so retention and
/// ordering can be tested without wall-clock delays; TTL scheduling lives
/// in the expiry module.
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::MAX_LIVE_NOTIFICATIONS;
use crate::events::OcsEvent;
use crate::logger::{self, LogTag};

use super::types::Notification;

pub struct NotificationStore {
    entries: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Derive a notification from an event and prepend it
    ///
    /// The live list is truncated to the most recent MAX_LIVE_NOTIFICATIONS
    /// entries; overflow evicts the oldest.
    pub fn add_event(&self, event: &OcsEvent) -> Notification {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let notification = Notification::from_event(id, event);

        let mut entries = self.entries.lock();
        entries.insert(0, notification.clone());
        entries.truncate(MAX_LIVE_NOTIFICATIONS);
        drop(entries);

        logger::debug(
            LogTag::Notify,
            &format!(
                "Notification {} added ({} for {})",
                id, notification.kind, notification.ocs_id
            ),
        );

        notification
    }

    /// Remove a notification by id
    ///
    /// No-op when the id is already absent, which resolves the race
    /// between the expiry timer and a manual dismissal.
    pub fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|n| n.id != id);
        before != entries.len()
    }

    /// Empty the live list immediately
    ///
    /// Pending expiry timers for removed ids become no-ops when they fire.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Snapshot of the live list, newest first
    pub fn live(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
