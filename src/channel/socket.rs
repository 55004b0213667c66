/// WebSocket run loop for the transport channel
///
/// One task owns the physical connection: it sends the keepalive ping
/// every 30 seconds, decodes inbound frames, and reacts to close
/// commands. The keepalive interval is local to this task, so it is
/// cancelled on every exit path - explicit close, transport error, or
/// remote close - and can never outlive the connection.
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::constants::{KEEPALIVE_INTERVAL, PING_FRAME};
use crate::dispatch;
use crate::errors::NotifyError;
use crate::events;
use crate::global::is_debug_channel_enabled;
use crate::logger::{log, LogTag};

use super::subscription;
use super::{ChannelCommand, ChannelState};

pub(super) async fn run(
    id: u64,
    url: Url,
    state_tx: watch::Sender<ChannelState>,
    mut commands: mpsc::UnboundedReceiver<ChannelCommand>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            log(
                LogTag::Channel,
                "ERROR",
                &format!("Channel {} failed to connect: {}", id, e),
            );
            subscription::notify_error(&NotifyError::Transport(e.to_string()));
            let _ = state_tx.send(ChannelState::Closed);
            super::release(id);
            return;
        }
    };

    let _ = state_tx.send(ChannelState::Open);
    if is_debug_channel_enabled() {
        log(LogTag::Channel, "OPEN", &format!("Channel {} open", id));
    }

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // First tick after one full interval, not immediately
    let mut keepalive = interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);

    loop {
        tokio::select! {
            // Close command from the owning view, or all handles dropped
            cmd = commands.recv() => {
                match cmd {
                    Some(ChannelCommand::Close) | None => {
                        let _ = ws_tx.send(Message::Close(None)).await;
                        surface_close(id, NotifyError::TransportClosed("closed locally".to_string()));
                        break;
                    }
                }
            }

            // Keepalive ping; a liveness signal only, no reply expected
            _ = keepalive.tick() => {
                if let Err(e) = ws_tx.send(Message::Text(PING_FRAME.to_string())).await {
                    log(
                        LogTag::Channel,
                        "ERROR",
                        &format!("Channel {} keepalive failed: {}", id, e),
                    );
                    subscription::notify_error(&NotifyError::Transport(e.to_string()));
                    break;
                }
                if is_debug_channel_enabled() {
                    log(LogTag::Channel, "PING", &format!("Channel {} keepalive sent", id));
                }
            }

            // Inbound frames
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&text);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Binary(_))) => {
                        // Control and binary frames carry no events
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        surface_close(id, NotifyError::TransportClosed("closed by remote".to_string()));
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log(
                            LogTag::Channel,
                            "ERROR",
                            &format!("Channel {} transport error: {}", id, e),
                        );
                        subscription::notify_error(&NotifyError::Transport(e.to_string()));
                        break;
                    }
                }
            }
        }
    }

    let _ = state_tx.send(ChannelState::Closed);
    super::release(id);
}

/// Surface a close to the subscription's on_close handler, once per
/// channel teardown
fn surface_close(id: u64, reason: NotifyError) {
    if is_debug_channel_enabled() {
        log(LogTag::Channel, "CLOSE", &format!("Channel {}: {}", id, reason));
    }
    subscription::notify_close();
}

/// Decode one frame and fan it out
///
/// A malformed frame is logged and discarded; it must never terminate
/// the channel.
fn handle_frame(text: &str) {
    match events::decode_frame(text) {
        Ok(event) => dispatch::deliver(&event),
        Err(e) => {
            crate::logger::debug(LogTag::Events, &format!("Discarded frame: {}", e));
        }
    }
}
