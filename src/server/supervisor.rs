//! Supervision of per-connection handler tasks.
//!
//! The supervisor is the single owner of the connection-to-task mapping:
//! handlers are added when accepted, remove themselves on exit, and are
//! drained with a bounded grace period at shutdown. Handlers that outlive
//! the grace period are logged and abandoned, never aborted — a handler
//! stuck in a blocking receive is the peer's problem to resolve.

use std::{
    fmt,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use futures::{Future, FutureExt};
use log::{error, warn};
use tokio_util::task::TaskTracker;

use crate::panic::payload_message;

/// Identifier assigned to an accepted connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// The raw identifier.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Tracks live connection-handler tasks.
#[derive(Default)]
pub struct ConnectionSupervisor {
    next_id: AtomicU64,
    active: DashMap<ConnectionId, SocketAddr>,
    tracker: TaskTracker,
}

impl ConnectionSupervisor {
    /// Create an empty supervisor.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Spawn and track a handler for a newly accepted connection.
    ///
    /// The future built by `make` runs under `catch_unwind`: a panicking
    /// handler is logged and discarded without affecting its siblings. The
    /// supervisor entry is removed when the handler exits, however it
    /// exits.
    pub fn spawn<F, Fut>(self: &Arc<Self>, peer: SocketAddr, make: F) -> ConnectionId
    where
        F: FnOnce(ConnectionId) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.active.insert(id, peer);
        let handler = make(id);
        let supervisor = Arc::clone(self);
        self.tracker.spawn(async move {
            if let Err(payload) = std::panic::AssertUnwindSafe(handler).catch_unwind().await {
                let message = payload_message(payload.as_ref());
                // Emit via both `log` and `tracing` for tests that capture
                // either.
                error!("connection handler panicked: id={id}, panic={message}");
                tracing::error!(%id, panic = %message, "connection handler panicked");
            }
            supervisor.active.remove(&id);
        });
        id
    }

    /// Number of handlers still running.
    #[must_use]
    pub fn active(&self) -> usize { self.active.len() }

    /// Stop accepting new handlers and wait up to `grace` for the live
    /// ones to finish. Stragglers are logged per connection and left to
    /// terminate on their own.
    pub async fn drain(&self, grace: Duration) {
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            return;
        }
        for entry in &self.active {
            warn!(
                "handler still active at shutdown, abandoning: id={}, peer={}",
                entry.key(),
                entry.value()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;

    fn peer() -> SocketAddr { "127.0.0.1:4242".parse().expect("socket address") }

    #[tokio::test]
    async fn handlers_remove_themselves_on_exit() {
        let supervisor = Arc::new(ConnectionSupervisor::new());
        let (tx, rx) = oneshot::channel::<()>();
        supervisor.spawn(peer(), |_| async move {
            let _ = rx.await;
        });
        assert_eq!(supervisor.active(), 1);

        drop(tx);
        supervisor.drain(Duration::from_secs(1)).await;
        assert_eq!(supervisor.active(), 0);
    }

    #[tokio::test]
    async fn drain_abandons_stuck_handlers() {
        let supervisor = Arc::new(ConnectionSupervisor::new());
        supervisor.spawn(peer(), |_| async move {
            std::future::pending::<()>().await;
        });

        supervisor.drain(Duration::from_millis(20)).await;
        // Still registered: the handler was abandoned, not killed.
        assert_eq!(supervisor.active(), 1);
    }

    #[tokio::test]
    async fn panicking_handler_is_contained_and_deregistered() {
        let supervisor = Arc::new(ConnectionSupervisor::new());
        supervisor.spawn(peer(), |_| async move {
            panic!("handler blew up");
        });
        supervisor.drain(Duration::from_secs(1)).await;
        assert_eq!(supervisor.active(), 0);
    }

    #[tokio::test]
    async fn identifiers_are_unique_and_displayable() {
        let supervisor = Arc::new(ConnectionSupervisor::new());
        let a = supervisor.spawn(peer(), |_| async {});
        let b = supervisor.spawn(peer(), |_| async {});
        assert_ne!(a, b);
        assert_eq!(a.to_string(), format!("conn-{}", a.as_u64()));
        supervisor.drain(Duration::from_secs(1)).await;
    }
}
