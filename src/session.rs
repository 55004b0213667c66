/// Process-wide session state - the authentication collaborator surface
///
/// Session issuance itself (token refresh, remaining time) lives outside
/// this core. The channel opens only while the session is authenticated
/// and carries an access token; logout closes the live channel.
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::logger::{self, LogTag};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub authenticated: bool,
    pub current_user: Option<String>,
    pub access_token: Option<String>,
}

static SESSION: Lazy<RwLock<SessionState>> = Lazy::new(|| RwLock::new(SessionState::default()));

/// Record an authenticated session
pub fn login(user: &str, access_token: &str) {
    let mut session = SESSION.write();
    session.authenticated = true;
    session.current_user = Some(user.to_string());
    session.access_token = Some(access_token.to_string());
    drop(session);

    logger::info(LogTag::Session, &format!("Session opened for {}", user));
}

/// Clear the session and close the live channel, if any
pub fn logout() {
    let had_session = {
        let mut session = SESSION.write();
        let had = session.authenticated;
        *session = SessionState::default();
        had
    };

    if had_session {
        logger::info(LogTag::Session, "Session closed");
    }

    // Channel must not outlive the session
    crate::channel::close();
}

pub fn is_authenticated() -> bool {
    SESSION.read().authenticated
}

pub fn current_user() -> Option<String> {
    SESSION.read().current_user.clone()
}

/// Access token for the channel handshake
///
/// Returns None unless the session is authenticated AND a token is
/// present; the channel treats None as a normal, non-exceptional state.
pub fn access_token() -> Option<String> {
    let session = SESSION.read();
    if session.authenticated {
        session.access_token.clone()
    } else {
        None
    }
}
