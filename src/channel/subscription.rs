/// The single transport-level subscription
///
/// Exactly one subscription may exist at a time for the whole process;
/// every other consumer registers at the callback registry instead and
/// never touches the transport directly. Subscribe is idempotent across
/// mount/unmount cycles of the owning provider: a second subscribe
/// returns the existing id rather than an error.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use uuid::Uuid;

use crate::dispatch::{CloseHandler, ErrorHandler, EventHandler};
use crate::errors::NotifyError;
use crate::events::OcsEvent;
use crate::logger::{self, LogTag};

/// Typed handlers bound by the owning provider
#[derive(Clone, Default)]
pub struct SubscriptionHandlers {
    pub on_status_changed: Option<EventHandler>,
    pub on_created: Option<EventHandler>,
    pub on_cancelled: Option<EventHandler>,
    pub on_error: Option<ErrorHandler>,
    pub on_close: Option<CloseHandler>,
}

impl SubscriptionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status_changed(mut self, f: impl Fn(&OcsEvent) + Send + Sync + 'static) -> Self {
        self.on_status_changed = Some(std::sync::Arc::new(f));
        self
    }

    pub fn on_created(mut self, f: impl Fn(&OcsEvent) + Send + Sync + 'static) -> Self {
        self.on_created = Some(std::sync::Arc::new(f));
        self
    }

    pub fn on_cancelled(mut self, f: impl Fn(&OcsEvent) + Send + Sync + 'static) -> Self {
        self.on_cancelled = Some(std::sync::Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&NotifyError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(std::sync::Arc::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(std::sync::Arc::new(f));
        self
    }

    fn handler_for(&self, event: &OcsEvent) -> Option<&EventHandler> {
        match event {
            OcsEvent::StatusChanged { .. } => self.on_status_changed.as_ref(),
            OcsEvent::Created { .. } => self.on_created.as_ref(),
            OcsEvent::Cancelled { .. } => self.on_cancelled.as_ref(),
        }
    }
}

struct Subscription {
    id: Uuid,
    handlers: SubscriptionHandlers,
}

/// Holder for the one active subscription
pub struct SubscriptionSlot {
    inner: RwLock<Option<Subscription>>,
}

impl SubscriptionSlot {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Bind handlers, or return the existing id if already bound
    pub fn subscribe(&self, handlers: SubscriptionHandlers) -> Uuid {
        let mut slot = self.inner.write();
        if let Some(active) = slot.as_ref() {
            return active.id;
        }

        let id = Uuid::new_v4();
        *slot = Some(Subscription { id, handlers });
        id
    }

    /// Remove the binding if `id` matches the active subscription
    ///
    /// A stale id (from an old teardown callback) is a no-op.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let mut slot = self.inner.write();
        match slot.as_ref() {
            Some(active) if active.id == id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.inner.read().as_ref().map(|s| s.id)
    }

    /// Invoke the event-kind-specific handler of the active subscription
    pub(crate) fn dispatch(&self, event: &OcsEvent) {
        let handler = {
            let slot = self.inner.read();
            slot.as_ref()
                .and_then(|s| s.handlers.handler_for(event).cloned())
        };

        if let Some(handler) = handler {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                logger::error(
                    LogTag::Channel,
                    "Subscription handler panicked while handling event",
                );
            }
        }
    }

    /// Surface a transport error to the registered on_error handler
    pub(crate) fn notify_error(&self, error: &NotifyError) {
        let handler = {
            let slot = self.inner.read();
            slot.as_ref().and_then(|s| s.handlers.on_error.clone())
        };

        if let Some(handler) = handler {
            if catch_unwind(AssertUnwindSafe(|| handler(error))).is_err() {
                logger::error(LogTag::Channel, "Subscription on_error handler panicked");
            }
        }
    }

    /// Surface a transport close to the registered on_close handler
    pub(crate) fn notify_close(&self) {
        let handler = {
            let slot = self.inner.read();
            slot.as_ref().and_then(|s| s.handlers.on_close.clone())
        };

        if let Some(handler) = handler {
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                logger::error(LogTag::Channel, "Subscription on_close handler panicked");
            }
        }
    }
}

impl Default for SubscriptionSlot {
    fn default() -> Self {
        Self::new()
    }
}

static SLOT: Lazy<SubscriptionSlot> = Lazy::new(SubscriptionSlot::new);

/// Bind typed handlers to the process-wide channel
pub fn subscribe(handlers: SubscriptionHandlers) -> Uuid {
    let id = SLOT.subscribe(handlers);
    logger::debug(LogTag::Channel, &format!("Subscription active: {}", id));
    id
}

/// Remove the binding on provider teardown; stale ids are ignored
pub fn unsubscribe(id: Uuid) {
    if SLOT.unsubscribe(id) {
        logger::debug(LogTag::Channel, &format!("Subscription removed: {}", id));
    }
}

pub fn is_subscribed() -> bool {
    SLOT.is_subscribed()
}

pub(crate) fn dispatch(event: &OcsEvent) {
    SLOT.dispatch(event)
}

pub(crate) fn notify_error(error: &NotifyError) {
    SLOT.notify_error(error)
}

pub(crate) fn notify_close() {
    SLOT.notify_close()
}
