use std::fmt;

/// Connection lifecycle. `Terminated` is final: a new session needs a new
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Registering,
    Ready,
    Terminated,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connecting => "Connecting",
            SessionState::Registering => "Registering",
            SessionState::Ready => "Ready",
            SessionState::Terminated => "Terminated",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Terminated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime state of one connection, owned by the session controller.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub connected: bool,
    /// Set once the server has accepted NICK/USER (001 RPL_WELCOME).
    pub registered: bool,
    /// Current nick; differs from the configured one after a collision or
    /// a NICK change.
    pub nickname: String,
    pub nick_retries: u32,
}

impl Session {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            state: SessionState::Disconnected,
            connected: false,
            registered: false,
            nickname: nickname.into(),
            nick_retries: 0,
        }
    }

    pub fn is_me(&self, nick: &str) -> bool {
        self.nickname.eq_ignore_ascii_case(nick)
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "session state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new("RustBot");
        assert_eq!(session.state, SessionState::Disconnected);
        assert!(!session.connected);
        assert!(!session.registered);
        assert!(session.is_me("rustbot"));
        assert!(!session.is_me("rustbot_"));
    }

    #[test]
    fn test_only_terminated_is_terminal() {
        assert!(SessionState::Terminated.is_terminal());
        for state in [
            SessionState::Disconnected,
            SessionState::Connecting,
            SessionState::Registering,
            SessionState::Ready,
        ] {
            assert!(!state.is_terminal());
        }
    }
}
