//! Concurrent set of live WebSocket connections.
//!
//! [`ConnectionRegistry`] is the only shared mutable state in the relay.
//! Every connection's open, message and close events run on independent
//! tasks, so `register`, `unregister` and `for_each` race by construction.
//! The set is a sharded [`DashMap`]: mutations lock a single shard, and
//! iteration works on a snapshot so no shard lock is ever held while a
//! broadcast callback runs.

use dashmap::DashMap;

use super::{Connection, ConnectionId};

/// Authoritative set of currently open connections.
///
/// # Concurrency
///
/// - `register` / `unregister` on different connections proceed in
///   parallel unless they hash to the same shard.
/// - `for_each` copies the handles out shard by shard, then releases every
///   lock before invoking the callback. Connections present for the whole
///   call are visited exactly once; connections added or removed during the
///   call may or may not be visited.
/// - Callers never need external synchronization.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    conns: DashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    /// Inserts a connection into the live set.
    ///
    /// Registering the same connection twice leaves a single entry.
    pub fn register(&self, conn: Connection) {
        self.conns.insert(conn.id(), conn);
    }

    /// Removes a connection from the live set.
    ///
    /// Returns `true` if the connection was present; a missing entry is a
    /// no-op.
    pub fn unregister(&self, conn: &Connection) -> bool {
        self.conns.remove(&conn.id()).is_some()
    }

    /// Invokes `f` once for every currently registered connection.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Connection),
    {
        let snapshot = self.snapshot();
        for conn in &snapshot {
            f(conn);
        }
    }

    /// Returns a point-in-time copy of every registered handle.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Connection> {
        self.conns.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns `true` if the connection with `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.conns.contains_key(&id)
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conns.len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::domain::RelayMessage;

    fn make_conn(root: &CancellationToken) -> (Connection, mpsc::Receiver<RelayMessage>) {
        Connection::new(SocketAddr::from(([127, 0, 0, 1], 9000)), 8, root)
    }

    #[test]
    fn register_and_contains() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_conn(&root);

        registry.register(conn.clone());
        assert!(registry.contains(conn.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_register_keeps_one_entry() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_conn(&root);

        registry.register(conn.clone());
        registry.register(conn);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_missing_is_noop() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_conn(&root);

        assert!(!registry.unregister(&conn));
        registry.register(conn.clone());
        assert!(registry.unregister(&conn));
        assert!(!registry.unregister(&conn));
        assert!(registry.is_empty());
    }

    #[test]
    fn for_each_visits_every_connection_once() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        let mut expected = HashSet::new();
        for _ in 0..10 {
            let (conn, rx) = make_conn(&root);
            expected.insert(conn.id());
            registry.register(conn);
            receivers.push(rx);
        }

        let mut visited = Vec::new();
        registry.for_each(|conn| visited.push(conn.id()));

        assert_eq!(visited.len(), expected.len());
        assert_eq!(visited.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn for_each_skips_unregistered() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let (kept, _rx1) = make_conn(&root);
        let (gone, _rx2) = make_conn(&root);
        registry.register(kept.clone());
        registry.register(gone.clone());

        registry.unregister(&gone);

        let mut visited = Vec::new();
        registry.for_each(|conn| visited.push(conn.id()));
        assert_eq!(visited, vec![kept.id()]);
    }

    #[test]
    fn callback_may_mutate_registry() {
        let root = CancellationToken::new();
        let registry = ConnectionRegistry::new();
        let (a, _rx1) = make_conn(&root);
        let (b, _rx2) = make_conn(&root);
        registry.register(a);
        registry.register(b);

        // Removing entries from inside the callback must not deadlock.
        registry.for_each(|conn| {
            registry.unregister(conn);
        });
        assert!(registry.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_churn_leaves_exactly_open_connections() {
        let root = CancellationToken::new();
        let registry = Arc::new(ConnectionRegistry::new());

        // Long-lived connections must be seen by every concurrent iteration.
        let mut stable = Vec::new();
        for _ in 0..8 {
            let (conn, rx) = make_conn(&root);
            registry.register(conn.clone());
            stable.push((conn, rx));
        }
        let stable_ids: HashSet<_> = stable.iter().map(|(c, _)| c.id()).collect();

        let mut workers = Vec::new();
        for worker in 0..16 {
            let registry = Arc::clone(&registry);
            let root = root.clone();
            workers.push(tokio::spawn(async move {
                let mut survivors = Vec::new();
                for i in 0..200 {
                    let (conn, rx) = make_conn(&root);
                    registry.register(conn.clone());
                    tokio::task::yield_now().await;
                    // Odd workers keep every tenth connection open.
                    if worker % 2 == 1 && i % 10 == 0 {
                        survivors.push((conn, rx));
                    } else {
                        registry.unregister(&conn);
                    }
                }
                survivors
            }));
        }

        let iterator = {
            let registry = Arc::clone(&registry);
            let stable_ids = stable_ids.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let mut seen = HashSet::new();
                    let mut duplicates = 0usize;
                    registry.for_each(|conn| {
                        if !seen.insert(conn.id()) {
                            duplicates += 1;
                        }
                    });
                    assert_eq!(duplicates, 0);
                    assert!(stable_ids.is_subset(&seen));
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut expected = stable_ids;
        let mut survivors = Vec::new();
        for worker in workers {
            let Ok(kept) = worker.await else {
                panic!("worker task failed");
            };
            expected.extend(kept.iter().map(|(c, _)| c.id()));
            survivors.extend(kept);
        }
        if iterator.await.is_err() {
            panic!("iterator task failed");
        }

        let final_ids: HashSet<_> = registry.snapshot().iter().map(Connection::id).collect();
        assert_eq!(final_ids, expected);
        assert_eq!(registry.len(), 8 + 8 * 20);
        drop(survivors);
    }
}
