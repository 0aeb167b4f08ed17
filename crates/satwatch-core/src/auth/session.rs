use std::fmt;

use tokio::sync::watch;
use tracing::info;

use super::store::{TokenKind, TokenStore};

/// Derived session state. Authenticated exactly when an access token is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    pub fn from_store(store: &dyn TokenStore) -> Self {
        if store.get(TokenKind::Access).is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => write!(f, "anonymous"),
            SessionState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Publishes session transitions to interested frontends.
///
/// Subscribers see the latest state; a frontend that receives
/// `Anonymous` after having been `Authenticated` should route the user
/// back to login.
#[derive(Debug)]
pub struct SessionMonitor {
    tx: watch::Sender<SessionState>,
}

impl SessionMonitor {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub(crate) fn started(&self) {
        self.transition(SessionState::Authenticated);
    }

    pub(crate) fn ended(&self) {
        self.transition(SessionState::Anonymous);
    }

    fn transition(&self, next: SessionState) {
        let changed = self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            info!(state = %next, "Session state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn test_state_derived_from_access_token() {
        let store = MemoryTokenStore::new();
        assert_eq!(SessionState::from_store(&store), SessionState::Anonymous);

        // A refresh token alone is not a session
        store.set(TokenKind::Refresh, "r1");
        assert_eq!(SessionState::from_store(&store), SessionState::Anonymous);

        store.set(TokenKind::Access, "a1");
        assert_eq!(SessionState::from_store(&store), SessionState::Authenticated);
        assert!(SessionState::from_store(&store).is_authenticated());
    }

    #[test]
    fn test_monitor_notifies_only_on_change() {
        let monitor = SessionMonitor::new(SessionState::Anonymous);
        let mut rx = monitor.subscribe();

        monitor.ended();
        assert!(!rx.has_changed().expect("sender alive"));

        monitor.started();
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), SessionState::Authenticated);

        monitor.started();
        assert!(!rx.has_changed().expect("sender alive"));

        monitor.ended();
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
        assert_eq!(monitor.current(), SessionState::Anonymous);
    }
}
