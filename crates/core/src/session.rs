use tokio::sync::watch;
use tracing::info;

use crate::models::transaction::UserId;

/// Transition reported by a [`SessionWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserId),
    SignedOut,
}

/// The signed-in user as seen by the core.
///
/// Authentication itself lives outside this crate; the host calls `sign_in`
/// / `sign_out` when its auth layer reports a change, and dashboards read the
/// current user from here.
#[derive(Debug)]
pub struct SessionHandle {
    sender: watch::Sender<Option<UserId>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn sign_in(&self, user_id: UserId) {
        info!(user = %user_id, "signed in");
        self.sender.send_replace(Some(user_id));
    }

    pub fn sign_out(&self) {
        if self.sender.send_replace(None).is_some() {
            info!("signed out");
        }
    }

    /// Current user, `None` when signed out.
    pub fn current(&self) -> Option<UserId> {
        self.sender.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Listen for sign-in / sign-out transitions from now on.
    pub fn watch(&self) -> SessionWatcher {
        SessionWatcher {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives session transitions. Intermediate states may be coalesced; the
/// latest one is always delivered.
pub struct SessionWatcher {
    receiver: watch::Receiver<Option<UserId>>,
}

impl SessionWatcher {
    /// Wait for the next transition. `None` once the handle is dropped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.receiver.changed().await.ok()?;
        let event = match self.receiver.borrow_and_update().clone() {
            Some(user_id) => SessionEvent::SignedIn(user_id),
            None => SessionEvent::SignedOut,
        };
        Some(event)
    }
}
