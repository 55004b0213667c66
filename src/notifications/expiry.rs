/// TTL scheduling for notifications, separated from store mutation
///
/// Each scheduled expiry is a plain timer keyed by notification id. When
/// it fires it calls `remove`, which is a no-op if the notification was
/// already dismissed or cleared, so no timer ever needs cancellation.
use std::sync::Arc;
use std::time::Duration;

use crate::constants::NOTIFICATION_TTL;
use crate::logger::{self, LogTag};

use super::store::NotificationStore;

/// Schedule removal of a notification after the standard retention window
pub fn schedule(store: Arc<NotificationStore>, id: u64) {
    schedule_after(store, id, NOTIFICATION_TTL);
}

/// Schedule removal after an explicit delay
pub fn schedule_after(store: Arc<NotificationStore>, id: u64, ttl: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if store.remove(id) {
            logger::debug(LogTag::Notify, &format!("Notification {} expired", id));
        }
    });
}
