use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::error::RelayError;
use crate::model::payload::Payload;
use crate::model::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl Deref for ConnectionId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a live peer connection.
///
/// Sending hands the payload to the connection's writer task, so it never
/// waits on the network. Cloning yields another handle to the same socket.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub role: Role,
    tx: UnboundedSender<Payload>,
}

impl Connection {
    pub fn new(role: Role, tx: UnboundedSender<Payload>) -> Connection {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
        let next_id = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
        Connection {
            id: ConnectionId(next_id),
            role,
            tx,
        }
    }

    pub fn send(&self, payload: Payload) -> Result<(), RelayError> {
        self.tx
            .send(payload)
            .map_err(|_| RelayError::ConnectionClosed(self.id))
    }
}

/// Live connection per role, at most one each.
///
/// The lock is only held for the lookup or update itself, never while a
/// message is being sent.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<Role, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> ConnectionRegistry {
        ConnectionRegistry::default()
    }

    /// Make `connection` the live holder of its role.
    ///
    /// A previous holder is evicted silently and returned. Messages queued
    /// for the role stay queued for the new holder.
    pub fn register(&self, connection: Connection) -> Option<Connection> {
        let role = connection.role;
        let id = connection.id;
        let evicted = self.connections.lock().insert(role, connection);

        match &evicted {
            Some(previous) => info!(
                %role,
                connection = *id,
                evicted = *previous.id,
                "Registered connection, replacing previous holder"
            ),
            None => info!(%role, connection = *id, "Registered connection"),
        }

        evicted
    }

    pub fn get(&self, role: Role) -> Option<Connection> {
        self.connections.lock().get(&role).cloned()
    }

    pub fn is_connected(&self, role: Role) -> bool {
        self.connections.lock().contains_key(&role)
    }

    /// Whether `id` is still the live holder of `role`.
    pub fn is_current(&self, role: Role, id: ConnectionId) -> bool {
        self.connections
            .lock()
            .get(&role)
            .is_some_and(|c| c.id == id)
    }

    /// Clear `role` if `id` still holds it.
    ///
    /// Returns false when a newer connection has taken the role in the
    /// meantime, in which case the mapping is left alone.
    pub fn unregister(&self, role: Role, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        match connections.get(&role) {
            Some(current) if current.id == id => {
                connections.remove(&role);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;

    fn connection(role: Role) -> (Connection, UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(role, tx), rx)
    }

    #[test]
    fn connection_ids_are_unique() {
        let (a, _ra) = connection(Role::Master);
        let (b, _rb) = connection(Role::Master);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn register_and_get() {
        let registry = ConnectionRegistry::new();
        assert!(registry.get(Role::Master).is_none());

        let (master, _rx) = connection(Role::Master);
        let id = master.id;
        assert!(registry.register(master).is_none());

        assert_eq!(registry.get(Role::Master).map(|c| c.id), Some(id));
        assert!(registry.get(Role::Viewer).is_none());
        assert!(registry.is_connected(Role::Master));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_registration_evicts_first() {
        let registry = ConnectionRegistry::new();
        let (c1, mut rx1) = connection(Role::Master);
        let (c2, mut rx2) = connection(Role::Master);
        let (id1, id2) = (c1.id, c2.id);

        let _ = registry.register(c1);
        let evicted = registry.register(c2);

        assert_eq!(evicted.map(|c| c.id), Some(id1));
        assert_eq!(registry.get(Role::Master).map(|c| c.id), Some(id2));
        assert!(!registry.is_current(Role::Master, id1));
        assert_eq!(registry.len(), 1);

        registry
            .get(Role::Master)
            .unwrap()
            .send("ANSWER:xyz".into())
            .unwrap();
        assert_eq!(rx2.try_recv().unwrap(), Payload::from("ANSWER:xyz"));
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn stale_unregister_is_ignored() {
        let registry = ConnectionRegistry::new();
        let (c1, _rx1) = connection(Role::Viewer);
        let (c2, _rx2) = connection(Role::Viewer);
        let (id1, id2) = (c1.id, c2.id);

        let _ = registry.register(c1);
        let _ = registry.register(c2);

        assert!(!registry.unregister(Role::Viewer, id1));
        assert_eq!(registry.get(Role::Viewer).map(|c| c.id), Some(id2));

        assert!(registry.unregister(Role::Viewer, id2));
        assert!(registry.get(Role::Viewer).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_holds_at_most_two() {
        let registry = ConnectionRegistry::new();
        let mut receivers = vec![];
        for role in [Role::Master, Role::Viewer, Role::Viewer, Role::Master] {
            let (c, rx) = connection(role);
            receivers.push(rx);
            let _ = registry.register(c);
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn send_fails_once_writer_is_gone() {
        let (c, rx) = connection(Role::Viewer);
        drop(rx);
        assert!(matches!(
            c.send("late".into()),
            Err(RelayError::ConnectionClosed(id)) if id == c.id
        ));
    }
}
