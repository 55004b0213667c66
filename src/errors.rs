/// Structured error handling for the notification core
///
/// Decode-level failures are always recovered locally (logged and
/// discarded); transport-level failures are surfaced exactly once to the
/// active subscription's error/close handlers and never re-thrown.
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    /// No access token was available at connect time. Non-fatal: the
    /// channel simply does not open and the caller may retry later.
    #[error("No access token available for channel connect")]
    AuthMissing,

    /// Malformed inbound JSON or unrecognized event type. Recovered by
    /// logging and discarding the frame.
    #[error("Frame decode error: {reason}")]
    FrameDecode { reason: String },

    /// Underlying connection error. Marks the channel not-connected;
    /// no automatic retry is attempted.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote or local close of the connection.
    #[error("Transport closed: {0}")]
    TransportClosed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifyError {
    /// Whether the owning view may reasonably call `connect()` again
    pub fn is_recoverable(&self) -> bool {
        match self {
            NotifyError::AuthMissing => true,
            NotifyError::Transport(_) => true,
            NotifyError::TransportClosed(_) => true,
            NotifyError::FrameDecode { .. } => true,
            NotifyError::Config(_) => false,
        }
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;
