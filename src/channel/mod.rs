/// Transport channel - the one physical event connection per session
///
/// Process-wide singleton: only one channel may be live at a time, created
/// on the first authenticated connect and torn down on logout, explicit
/// close, or socket failure. No automatic reconnect is attempted; the
/// owning view calls `connect()` again on its next mount.
///
/// State machine: Disconnected -> Connecting -> Open -> Closed. Open
/// reaches Closed from three triggers: explicit close, transport error,
/// remote close.
mod socket;
pub mod subscription;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};
use url::Url;
use uuid::Uuid;

use crate::constants::WS_ENDPOINT_PATH;
use crate::errors::{NotifyError, NotifyResult};
use crate::global;
use crate::logger::{self, log, LogTag};
use crate::session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Open,
    Closed,
}

pub(crate) enum ChannelCommand {
    Close,
}

/// Handle to the live channel
///
/// Cloneable; all clones address the same underlying connection. The
/// handle only reflects "open" readiness, not "authenticated and
/// receiving".
#[derive(Clone)]
pub struct ChannelHandle {
    id: u64,
    commands: mpsc::UnboundedSender<ChannelCommand>,
    state: watch::Receiver<ChannelState>,
}

impl ChannelHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    /// Request close of this channel
    pub fn close(&self) {
        let _ = self.commands.send(ChannelCommand::Close);
    }
}

static CHANNEL: Lazy<Mutex<Option<ChannelHandle>>> = Lazy::new(|| Mutex::new(None));
static NEXT_CHANNEL_ID: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

/// Open the event channel for the current session
///
/// Returns None (not an error) when no access token is available, so
/// callers can treat "not authenticated" as a normal state. While a
/// channel is Connecting or Open, returns the existing handle instead of
/// opening a second connection. Does not block: connection establishment
/// completes asynchronously and is observable via the handle's state.
pub fn connect() -> Option<ChannelHandle> {
    let token = match session::access_token() {
        Some(token) => token,
        None => {
            logger::debug(
                LogTag::Channel,
                &format!("Connect skipped: {}", NotifyError::AuthMissing),
            );
            return None;
        }
    };

    let mut slot = CHANNEL.lock();
    if let Some(handle) = slot.as_ref() {
        if matches!(
            handle.state(),
            ChannelState::Connecting | ChannelState::Open
        ) {
            return Some(handle.clone());
        }
    }

    let config = global::get_config_clone();
    let url = match endpoint_url(&config.ws_host, &token) {
        Ok(url) => url,
        Err(e) => {
            logger::error(LogTag::Channel, &format!("Connect failed: {}", e));
            return None;
        }
    };

    let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::SeqCst);
    let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

    let handle = ChannelHandle {
        id,
        commands: cmd_tx,
        state: state_rx,
    };
    *slot = Some(handle.clone());
    drop(slot);

    tokio::spawn(socket::run(id, url, state_tx, cmd_rx));

    log(
        LogTag::Channel,
        "CONNECT",
        &format!("Channel {} connecting to {}", id, config.ws_host),
    );

    Some(handle)
}

/// Subscribe to the event stream, creating the channel if none exists
///
/// The entry point for the owning view: binds the typed handlers and
/// opens the channel in one call. Idempotent on both halves - repeat
/// calls return the existing subscription id and the existing handle.
/// The handle is None when no access token is available; the handlers
/// stay bound and take effect once a later call finds a token.
pub fn subscribe(handlers: subscription::SubscriptionHandlers) -> (Uuid, Option<ChannelHandle>) {
    let id = subscription::subscribe(handlers);
    (id, connect())
}

/// Close the live channel, if any
pub fn close() {
    let handle = CHANNEL.lock().take();
    if let Some(handle) = handle {
        handle.close();
        log(
            LogTag::Channel,
            "CLOSE",
            &format!("Channel {} close requested", handle.id()),
        );
    }
}

/// Whether the channel is currently open
pub fn is_connected() -> bool {
    CHANNEL
        .lock()
        .as_ref()
        .map(|h| h.is_open())
        .unwrap_or(false)
}

/// Full connection state signal for "disconnected" indicators
pub fn connection_state() -> ChannelState {
    CHANNEL
        .lock()
        .as_ref()
        .map(|h| h.state())
        .unwrap_or(ChannelState::Disconnected)
}

/// Drop the global handle once the run loop for `id` has finished
///
/// Guarded by id so a stale task never evicts a newer channel.
pub(crate) fn release(id: u64) {
    let mut slot = CHANNEL.lock();
    if slot.as_ref().map(|h| h.id) == Some(id) {
        *slot = None;
    }
}

/// Build the endpoint URL: ws://<host>/ws/ocs/?token=<accessToken>
fn endpoint_url(host: &str, token: &str) -> NotifyResult<Url> {
    let base = format!("ws://{}{}", host, WS_ENDPOINT_PATH);
    let mut url =
        Url::parse(&base).map_err(|e| NotifyError::Config(format!("Bad ws host: {}", e)))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{self, CallbackEntry};
    use crate::channel::subscription::SubscriptionHandlers;
    use crate::global::Configs;
    use crate::notifications;
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
    use tokio_tungstenite::tungstenite::Message;

    #[test]
    fn test_endpoint_url_shape() {
        let url = endpoint_url("ocs.example.org:9000", "abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "ws://ocs.example.org:9000/ws/ocs/?token=abc123"
        );
    }

    #[test]
    fn test_endpoint_url_escapes_token() {
        let url = endpoint_url("127.0.0.1:8000", "a b&c").unwrap();
        assert!(url.as_str().contains("token=a+b%26c"));
    }

    /// Loopback event server: accepts connections in a loop, reports each
    /// request path, sends the frames in order, then drains until the
    /// client goes away.
    async fn spawn_event_server(
        frames: Vec<String>,
    ) -> (
        std::net::SocketAddr,
        tokio::sync::mpsc::UnboundedReceiver<String>,
    ) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (path_tx, path_rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let path_tx = path_tx.clone();
                let frames = frames.clone();
                tokio::spawn(async move {
                    let mut ws =
                        match accept_hdr_async(stream, move |req: &Request, resp: Response| {
                            let _ = path_tx.send(req.uri().to_string());
                            Ok(resp)
                        })
                        .await
                        {
                            Ok(ws) => ws,
                            Err(_) => return,
                        };

                    for frame in frames {
                        if ws.send(Message::Text(frame)).await.is_err() {
                            return;
                        }
                    }

                    while let Some(msg) = ws.next().await {
                        match msg {
                            Ok(Message::Close(_)) | Err(_) => break,
                            _ => {}
                        }
                    }
                });
            }
        });

        (addr, path_rx)
    }

    // Exercises the global singleton end to end, so every global touched
    // here (session, configs, channel slot) is confined to this one test.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_channel_lifecycle_end_to_end() {
        crate::session::logout();

        // No token present: handlers bind, but no connection opens
        let (sub_id, no_handle) = subscribe(SubscriptionHandlers::new());
        assert!(no_handle.is_none());
        assert!(!is_connected());
        assert_eq!(connection_state(), ChannelState::Disconnected);

        // The server leads with an undecodable frame; the valid event
        // behind it only arrives if the channel survives the bad one.
        let frames = vec![
            "this is not an event frame".to_string(),
            r#"{
                "type": "OCS_CREATED",
                "ocsId": "OCS-77",
                "ocsPk": 77,
                "jobRole": "lab",
                "jobType": "blood_panel",
                "priority": "urgent",
                "patientName": "Lee, S.",
                "doctorName": "Dr. Choi",
                "message": "new order",
                "timestamp": "2024-03-01T10:00:00Z"
            }"#
            .to_string(),
        ];
        let (addr, mut path_rx) = spawn_event_server(frames).await;

        crate::global::set_configs(Configs {
            ws_host: addr.to_string(),
        });
        crate::session::login("tester", "tok-123");

        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
        callbacks::add_event_callback(
            "lifecycle-test",
            CallbackEntry::new().on_created(move |event| {
                let _ = event_tx.send(event.ocs_id().to_string());
            }),
        );

        // With a token the same call opens the channel and returns the
        // already-bound subscription id
        let (sub_again, maybe_handle) = subscribe(SubscriptionHandlers::new());
        assert_eq!(sub_again, sub_id);
        let handle = maybe_handle.expect("channel should open with a token");

        // Second connect while live returns the same channel
        let again = connect().expect("idempotent connect");
        assert_eq!(handle.id(), again.id());

        let received = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("event should arrive")
            .expect("callback sender alive");
        assert_eq!(received, "OCS-77");
        // The malformed frame preceding it was discarded without
        // terminating the channel
        assert!(is_connected());

        // Handshake used the fixed endpoint parameterized by the token
        let path = tokio::time::timeout(Duration::from_secs(5), path_rx.recv())
            .await
            .expect("handshake path should be reported")
            .expect("server alive");
        assert!(path.starts_with("/ws/ocs/"), "path was {}", path);
        assert!(path.contains("token=tok-123"), "path was {}", path);

        // Store was updated before the callback fired
        assert!(notifications::live().iter().any(|n| n.ocs_id == "OCS-77"));

        close();
        for _ in 0..50 {
            if handle.state() == ChannelState::Closed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(handle.state(), ChannelState::Closed);
        assert!(!is_connected());
        assert_eq!(connection_state(), ChannelState::Disconnected);

        // Fresh connect opens a new channel; logout must tear it down
        let handle2 = connect().expect("reconnect after close");
        assert_ne!(handle.id(), handle2.id());
        let received = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("event should arrive on the new channel")
            .expect("callback sender alive");
        assert_eq!(received, "OCS-77");

        crate::session::logout();
        for _ in 0..50 {
            if handle2.state() == ChannelState::Closed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(handle2.state(), ChannelState::Closed);
        assert!(!is_connected());
        assert_eq!(connection_state(), ChannelState::Disconnected);
        assert!(crate::session::access_token().is_none());

        callbacks::remove_event_callback("lifecycle-test");
        subscription::unsubscribe(sub_id);
    }
}
