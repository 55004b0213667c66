/// Callback registry - page-scoped fan-out over the single event stream
///
/// Lets N independent page-level consumers observe the same events as the
/// transport subscription without each opening a connection. Each owner
/// keys strictly by its own id, so no coordination between owners is
/// needed; dispatch iterates a snapshot taken at dispatch time, which
/// makes registration and removal during dispatch well-defined.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::dispatch::{EventHandler, RefreshHandler};
use crate::events::OcsEvent;
use crate::logger::{self, LogTag};

/// One page's registration: optional per-kind handlers plus an optional
/// auto-refresh thunk invoked after any event of any type
#[derive(Clone, Default)]
pub struct CallbackEntry {
    pub on_status_changed: Option<EventHandler>,
    pub on_created: Option<EventHandler>,
    pub on_cancelled: Option<EventHandler>,
    pub auto_refresh: Option<RefreshHandler>,
}

impl CallbackEntry {
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

    pub fn auto_refresh(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.auto_refresh = Some(std::sync::Arc::new(f));
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

/// Registry of callback entries, iterated in registration order
pub struct CallbackRegistry {
    entries: RwLock<Vec<(String, CallbackEntry)>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Insert or replace the entry at `id`
    ///
    /// Replacing keeps the original registration position so repeated
    /// registration from the same page does not reorder dispatch.
    pub fn add(&self, id: impl Into<String>, entry: CallbackEntry) {
        let id = id.into();
        let mut entries = self.entries.write();
        if let Some(existing) = entries.iter_mut().find(|(eid, _)| *eid == id) {
            existing.1 = entry;
        } else {
            entries.push((id, entry));
        }
    }

    /// Delete the entry at `id`; no-op if absent
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(eid, _)| eid != id);
        before != entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().iter().any(|(eid, _)| eid == id)
    }

    /// Invoke every current entry for an event
    ///
    /// The entry list is snapshotted before iteration: entries removed
    /// before this call never see the event, entries added during it see
    /// only later events. Per entry, the matching typed handler runs
    /// first, then the auto-refresh thunk; a panic in one entry is
    /// contained and never blocks the remaining entries.
    pub fn dispatch(&self, event: &OcsEvent) {
        let snapshot: Vec<(String, CallbackEntry)> = self.entries.read().clone();

        for (id, entry) in &snapshot {
            if let Some(handler) = entry.handler_for(event) {
                let handler = handler.clone();
                if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                    logger::error(
                        LogTag::Callbacks,
                        &format!("Callback entry '{}' panicked while handling event", id),
                    );
                }
            }

            if let Some(refresh) = &entry.auto_refresh {
                let refresh = refresh.clone();
                if catch_unwind(AssertUnwindSafe(|| refresh())).is_err() {
                    logger::error(
                        LogTag::Callbacks,
                        &format!("Callback entry '{}' panicked during auto-refresh", id),
                    );
                }
            }
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: Lazy<CallbackRegistry> = Lazy::new(CallbackRegistry::new);

/// The process-wide callback registry
pub fn registry() -> &'static CallbackRegistry {
    &REGISTRY
}

/// Register (or replace) the callback entry for a page id
pub fn add_event_callback(id: impl Into<String>, entry: CallbackEntry) {
    let id = id.into();
    registry().add(id.clone(), entry);
    logger::debug(
        LogTag::Callbacks,
        &format!(
            "Callback entry '{}' registered ({} total)",
            id,
            registry().len()
        ),
    );
}

/// Remove the callback entry for a page id on its teardown
pub fn remove_event_callback(id: &str) {
    if registry().remove(id) {
        logger::debug(
            LogTag::Callbacks,
            &format!(
                "Callback entry '{}' removed ({} remaining)",
                id,
                registry().len()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn cancelled_event() -> OcsEvent {
        OcsEvent::Cancelled {
            ocs_id: "OCS-1".to_string(),
            ocs_pk: 1,
            reason: "duplicate".to_string(),
            actor_name: "Dr. Park".to_string(),
            message: "Order cancelled".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn created_event() -> OcsEvent {
        OcsEvent::Created {
            ocs_id: "OCS-2".to_string(),
            ocs_pk: 2,
            job_role: "lab".to_string(),
            job_type: "blood_panel".to_string(),
            priority: "routine".to_string(),
            patient_name: "Lee, S.".to_string(),
            doctor_name: "Dr. Choi".to_string(),
            message: "new order".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_insert_replace_keeps_position() {
        let reg = CallbackRegistry::new();
        reg.add("page-a", CallbackEntry::new());
        reg.add("page-b", CallbackEntry::new());
        reg.add("page-a", CallbackEntry::new());

        assert_eq!(reg.len(), 2);
        let order: Vec<String> = reg.entries.read().iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(order, vec!["page-a", "page-b"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let reg = CallbackRegistry::new();
        assert!(!reg.remove("never-registered"));
    }

    #[test]
    fn test_typed_handler_matches_event_kind() {
        let reg = CallbackRegistry::new();
        let cancelled_hits = Arc::new(AtomicUsize::new(0));
        let created_hits = Arc::new(AtomicUsize::new(0));

        let c1 = cancelled_hits.clone();
        let c2 = created_hits.clone();
        reg.add(
            "page-a",
            CallbackEntry::new()
                .on_cancelled(move |_| {
                    c1.fetch_add(1, Ordering::SeqCst);
                })
                .on_created(move |_| {
                    c2.fetch_add(1, Ordering::SeqCst);
                }),
        );

        reg.dispatch(&cancelled_event());
        assert_eq!(cancelled_hits.load(Ordering::SeqCst), 1);
        assert_eq!(created_hits.load(Ordering::SeqCst), 0);

        reg.dispatch(&created_event());
        assert_eq!(created_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_entry_does_not_receive_later_events() {
        let reg = CallbackRegistry::new();
        let removed_hits = Arc::new(AtomicUsize::new(0));
        let kept_hits = Arc::new(AtomicUsize::new(0));

        let r = removed_hits.clone();
        reg.add(
            "page-x",
            CallbackEntry::new().on_cancelled(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let k = kept_hits.clone();
        reg.add(
            "page-y",
            CallbackEntry::new().on_cancelled(move |_| {
                k.fetch_add(1, Ordering::SeqCst);
            }),
        );

        reg.remove("page-x");
        reg.dispatch(&cancelled_event());

        assert_eq!(removed_hits.load(Ordering::SeqCst), 0);
        assert_eq!(kept_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_entry_does_not_block_others() {
        let reg = CallbackRegistry::new();
        let survivor_hits = Arc::new(AtomicUsize::new(0));

        reg.add(
            "page-bad",
            CallbackEntry::new().on_cancelled(|_| {
                panic!("handler blew up");
            }),
        );
        let s = survivor_hits.clone();
        reg.add(
            "page-good",
            CallbackEntry::new().on_cancelled(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            }),
        );

        reg.dispatch(&cancelled_event());
        assert_eq!(survivor_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_auto_refresh_runs_in_registration_order() {
        let reg = CallbackRegistry::new();
        let calls: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let a = calls.clone();
        reg.add(
            "page-a",
            CallbackEntry::new().auto_refresh(move || {
                a.lock().unwrap().push("a");
            }),
        );
        let b = calls.clone();
        reg.add(
            "page-b",
            CallbackEntry::new().auto_refresh(move || {
                b.lock().unwrap().push("b");
            }),
        );

        reg.dispatch(&cancelled_event());
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_typed_handler_before_auto_refresh_per_entry() {
        let reg = CallbackRegistry::new();
        let calls: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let h = calls.clone();
        let r = calls.clone();
        reg.add(
            "page-a",
            CallbackEntry::new()
                .on_cancelled(move |_| {
                    h.lock().unwrap().push("handler");
                })
                .auto_refresh(move || {
                    r.lock().unwrap().push("refresh");
                }),
        );

        reg.dispatch(&cancelled_event());
        assert_eq!(*calls.lock().unwrap(), vec!["handler", "refresh"]);
    }

    #[test]
    fn test_auto_refresh_fires_for_any_event_kind() {
        let reg = CallbackRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        reg.add(
            "page-a",
            CallbackEntry::new().auto_refresh(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        reg.dispatch(&cancelled_event());
        reg.dispatch(&created_event());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
