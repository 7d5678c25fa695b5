use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Lifecycle of one streaming connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Polling loop running or sleeping between polls
    Active,
    /// Disconnect observed, loop winding down
    Closing,
    /// Terminal, no further upstream calls
    Closed,
}

/// One open streaming client.
///
/// Clones share the same liveness token and state, so the transport can keep
/// one handle while the polling loop owns another.
#[derive(Debug, Clone)]
pub struct Connection {
    id: Uuid,
    liveness: CancellationToken,
    state: Arc<watch::Sender<StreamState>>,
}

impl Connection {
    pub fn new() -> Self {
        Self::with_liveness(CancellationToken::new())
    }

    /// Connection that is also cancelled when `parent` is, e.g. on server shutdown
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self::with_liveness(parent.child_token())
    }

    fn with_liveness(liveness: CancellationToken) -> Self {
        let (state, _) = watch::channel(StreamState::Active);
        Self {
            id: Uuid::now_v7(),
            liveness,
            state: Arc::new(state),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    /// Flip the liveness signal; the polling loop stops within one iteration
    pub fn disconnect(&self) {
        self.liveness.cancel();
    }

    pub fn liveness(&self) -> &CancellationToken {
        &self.liveness
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    #[cfg(test)]
    pub(crate) fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    pub(crate) fn transition(&self, next: StreamState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!("Connection {} {:?} -> {:?}", self.id, previous, next);
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves the connection to `Closed` when the polling loop goes away,
/// whether it finished on its own or the transport dropped it.
pub(crate) struct CloseOnDrop(pub(crate) Connection);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if self.0.state() == StreamState::Active {
            self.0.transition(StreamState::Closing);
        }
        self.0.liveness.cancel();
        self.0.transition(StreamState::Closed);
    }
}
