/// Event delivery pipeline - one decoded event, every consumer
///
/// Events are delivered in frame-arrival order with no batching. Within a
/// single event the notification store is updated first, then the
/// transport-level subscription's typed handler runs, then every callback
/// registry entry; an auto-refresh thunk that reads the store therefore
/// always observes the new entry.
use std::sync::Arc;

use crate::callbacks;
use crate::errors::NotifyError;
use crate::events::OcsEvent;
use crate::global::is_debug_events_enabled;
use crate::logger::{self, LogTag};
use crate::notifications;

/// Handler invoked with a decoded event
pub type EventHandler = Arc<dyn Fn(&OcsEvent) + Send + Sync>;

/// Handler invoked when the transport surfaces an error
pub type ErrorHandler = Arc<dyn Fn(&NotifyError) + Send + Sync>;

/// Handler invoked when the transport closes
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// Thunk invoked after any event of any type (page auto-refresh)
pub type RefreshHandler = Arc<dyn Fn() + Send + Sync>;

/// Deliver one decoded event to the store, the subscription, and every
/// registered callback entry
pub fn deliver(event: &OcsEvent) {
    let notification = notifications::record_event(event);

    crate::channel::subscription::dispatch(event);
    callbacks::registry().dispatch(event);

    if is_debug_events_enabled() {
        logger::debug(
            LogTag::Events,
            &format!(
                "Delivered event for {} (notification {}, {} callback entries)",
                event.ocs_id(),
                notification.id,
                callbacks::registry().len()
            ),
        );
    }
}
