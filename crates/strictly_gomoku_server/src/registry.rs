//! Live connection set used for broadcast.
//!
//! Each registered connection owns a bounded outbound channel drained by its
//! writer task. Sending never touches a socket: messages are only queued,
//! so callers may broadcast while holding other locks. A connection whose
//! queue is full is treated as stalled and dropped from the set; dropping
//! its sender ends its writer task.

use bytes::Bytes;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, instrument, warn};

/// Identifier assigned to each registered connection.
pub type ConnectionId = u64;

#[derive(Debug)]
struct Entry {
    peer: SocketAddr,
    outbound: mpsc::Sender<Bytes>,
}

/// Thread-safe set of live connections.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    connections: Mutex<HashMap<ConnectionId, Entry>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Entry>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a connection and returns its id.
    #[instrument(skip(self, outbound))]
    pub fn register(&self, peer: SocketAddr, outbound: mpsc::Sender<Bytes>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut connections = self.lock();
        connections.insert(id, Entry { peer, outbound });
        info!(id, count = connections.len(), "Connection registered");
        id
    }

    /// Removes a connection. Returns false if it was already gone.
    #[instrument(skip(self))]
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let mut connections = self.lock();
        let removed = connections.remove(&id);
        if let Some(entry) = &removed {
            info!(id, peer = %entry.peer, count = connections.len(), "Connection unregistered");
        }
        removed.is_some()
    }

    /// Queues `message` for one connection.
    pub fn send_to(&self, id: ConnectionId, message: Bytes) -> bool {
        let mut connections = self.lock();
        let Some(entry) = connections.get(&id) else {
            return false;
        };
        match entry.outbound.try_send(message) {
            Ok(()) => true,
            Err(err) => {
                drop_failed(&mut connections, id, &err);
                false
            }
        }
    }

    /// Queues `message` for every registered connection.
    ///
    /// Returns how many connections accepted it. Stalled or closed
    /// connections are removed.
    pub fn broadcast(&self, message: &Bytes) -> usize {
        let mut connections = self.lock();
        let mut failed = Vec::new();
        let mut delivered = 0;

        for (&id, entry) in connections.iter() {
            match entry.outbound.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => failed.push((id, err)),
            }
        }
        for (id, err) in failed {
            drop_failed(&mut connections, id, &err);
        }

        debug!(delivered, "Broadcast queued");
        delivered
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True while `id` is registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }
}

fn drop_failed(
    connections: &mut HashMap<ConnectionId, Entry>,
    id: ConnectionId,
    err: &TrySendError<Bytes>,
) {
    if let Some(entry) = connections.remove(&id) {
        match err {
            TrySendError::Full(_) => {
                warn!(id, peer = %entry.peer, "Outbound queue full, dropping connection")
            }
            TrySendError::Closed(_) => {
                debug!(id, peer = %entry.peer, "Writer gone, dropping connection")
            }
        }
    }
}

/// Registry membership that ends when dropped.
///
/// Held by a connection handler so every exit path, including unwinding,
/// removes the connection from broadcast.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<SessionRegistry>,
    id: ConnectionId,
}

impl Registration {
    /// Registers `peer` and returns the guard.
    pub fn new(
        registry: Arc<SessionRegistry>,
        peer: SocketAddr,
        outbound: mpsc::Sender<Bytes>,
    ) -> Self {
        let id = registry.register(peer, outbound);
        Self { registry, id }
    }

    /// The registered connection's id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        registry.register(peer(1), tx_a);
        registry.register(peer(2), tx_b);

        let message = Bytes::from_static(b"WINX\n");
        assert_eq!(registry.broadcast(&message), 2);
        assert_eq!(rx_a.recv().await.unwrap(), message);
        assert_eq!(rx_b.recv().await.unwrap(), message);
    }

    #[test]
    fn test_unregister_removes_connection() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::channel(4);
        let id = registry.register(peer(1), tx);
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stalled_connection_dropped() {
        let registry = SessionRegistry::new();
        let (tx_slow, _rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(8);
        let slow = registry.register(peer(1), tx_slow);
        let fast = registry.register(peer(2), tx_fast);

        let message = Bytes::from_static(b"x\n");
        assert_eq!(registry.broadcast(&message), 2);
        // The slow queue is now full.
        assert_eq!(registry.broadcast(&message), 1);
        assert!(!registry.contains(slow));
        assert!(registry.contains(fast));
        assert!(rx_fast.try_recv().is_ok());
    }

    #[test]
    fn test_closed_receiver_dropped() {
        let registry = SessionRegistry::new();
        let (tx, rx) = mpsc::channel(4);
        let id = registry.register(peer(1), tx);
        drop(rx);
        assert!(!registry.send_to(id, Bytes::from_static(b"x\n")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registration_guard_unregisters_on_drop() {
        let registry = Arc::new(SessionRegistry::new());
        let (tx, _rx) = mpsc::channel(4);
        let registration = Registration::new(registry.clone(), peer(9), tx);
        let id = registration.id();
        assert!(registry.contains(id));
        drop(registration);
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = SessionRegistry::new();
        let ids: Vec<_> = (0..5)
            .map(|i| {
                let (tx, _rx) = mpsc::channel(1);
                registry.register(peer(i), tx)
            })
            .collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 5);
    }
}
