use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

// Type alias for user IDs (web layer converts the verified token subject to String)
pub type UserId = String;

/// An already-serialized event. Cloning shares the same bytes between every
/// connection the event is fanned out to.
pub type Payload = Arc<str>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-user registry of the bounded queues feeding open event streams.
///
/// A user key is present if and only if that user has at least one registered connection.
/// Every mutation of a user's connection set happens under that key's write lock
/// (`DashMap::entry`), and fan-out only holds the read lock, so lookups for unrelated users
/// never wait on each other. No lock is held across an await point or a blocking send.
pub struct ConnectionRegistry {
    user_index: DashMap<UserId, HashMap<ConnectionId, Sender<Payload>>>,
    capacity: usize,
    closed: AtomicBool,
}

impl ConnectionRegistry {
    /// `capacity` is the number of payloads a connection may have pending; at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            user_index: DashMap::new(),
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Registers a new connection for `user_id`.
    ///
    /// Returns the receiving half of the connection's queue together with the token that
    /// removes it again. Once the registry is closed the returned queue is already closed.
    pub fn subscribe(self: &Arc<Self>, user_id: UserId) -> (Receiver<Payload>, Unsubscribe) {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let connection_id = ConnectionId::new();

        if self.is_closed() {
            debug!("Refusing SSE registration for user {user_id}: hub is shut down");
            let unsubscribe = Unsubscribe::new(Arc::clone(self), user_id, connection_id);
            unsubscribe.released.store(true, Ordering::Release);
            return (receiver, unsubscribe);
        }

        self.user_index
            .entry(user_id.clone())
            .or_default()
            .insert(connection_id.clone(), sender);

        // A shutdown racing with the insert above must not leave a live sender behind.
        if self.is_closed() {
            self.unsubscribe(&user_id, &connection_id);
        }

        (
            receiver,
            Unsubscribe::new(Arc::clone(self), user_id, connection_id),
        )
    }

    /// Removes one connection, dropping the user's entry with its last connection.
    /// Dropping the stored sender closes the queue for its reader.
    fn unsubscribe(&self, user_id: &str, connection_id: &ConnectionId) -> bool {
        match self.user_index.entry(user_id.to_owned()) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(connection_id).is_some();
                if entry.get().is_empty() {
                    entry.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Offers `payload` to every connection of `user_id` without waiting.
    ///
    /// A connection whose queue is full misses this payload; nothing is retried and no error
    /// is reported. Returns how many connections accepted it (0 for offline users).
    pub fn publish(&self, user_id: &str, payload: &Payload) -> usize {
        let Some(connections) = self.user_index.get(user_id) else {
            trace!("No SSE connections for user {user_id}, nothing to deliver");
            return 0;
        };

        let mut delivered = 0;
        for (connection_id, sender) in connections.iter() {
            match sender.try_send(Arc::clone(payload)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    trace!(
                        "Dropped event for SSE connection {}: queue full",
                        connection_id.as_str()
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(
                        "SSE connection {} went away before unregistering",
                        connection_id.as_str()
                    );
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.user_index
            .get(user_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    /// Number of users with at least one open connection.
    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes every queue and refuses new registrations. Returns how many connections were open.
    pub fn close_all(&self) -> usize {
        self.closed.store(true, Ordering::Release);

        let mut closed = 0;
        self.user_index.retain(|_, connections| {
            closed += connections.len();
            false
        });
        closed
    }
}

/// Release token for one registered connection.
///
/// Releasing is idempotent and also happens on drop, so a connection is unregistered
/// however its stream ends.
pub struct Unsubscribe {
    registry: Arc<ConnectionRegistry>,
    user_id: UserId,
    connection_id: ConnectionId,
    released: AtomicBool,
}

impl Unsubscribe {
    fn new(registry: Arc<ConnectionRegistry>, user_id: UserId, connection_id: ConnectionId) -> Self {
        Self {
            registry,
            user_id,
            connection_id,
            released: AtomicBool::new(false),
        }
    }

    /// Unregisters the connection. Returns `true` only for the call that removed it.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        let removed = self
            .registry
            .unsubscribe(&self.user_id, &self.connection_id);
        if removed {
            info!(
                "Unregistered SSE connection {} for user {}",
                self.connection_id.as_str(),
                self.user_id
            );
        }
        removed
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn payload(text: &str) -> Payload {
        Arc::from(text)
    }

    #[test]
    fn publish_to_an_offline_user_is_a_no_op() {
        let registry = Arc::new(ConnectionRegistry::new(8));

        assert_eq!(registry.publish("nobody", &payload("{}")), 0);
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn user_key_exists_only_while_connections_remain() {
        let registry = Arc::new(ConnectionRegistry::new(8));

        let (_rx1, first) = registry.subscribe("u1".to_string());
        let (_rx2, second) = registry.subscribe("u1".to_string());
        assert_eq!(registry.subscriber_count("u1"), 2);
        assert_eq!(registry.user_count(), 1);

        assert!(first.release());
        assert_eq!(registry.subscriber_count("u1"), 1);
        assert_eq!(registry.user_count(), 1);

        assert!(second.release());
        assert_eq!(registry.subscriber_count("u1"), 0);
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn exact_payload_reaches_only_the_targeted_user() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (mut c1, _token) = registry.subscribe("u1".to_string());
        let json = r#"{"type":"appointment_status","appointment_id":"a1","status":"accepted","message":"Your appointment status was updated"}"#;

        assert_eq!(registry.publish("u1", &payload(json)), 1);
        assert_eq!(&*c1.try_recv().unwrap(), json);
        assert_eq!(c1.try_recv().unwrap_err(), TryRecvError::Empty);

        assert_eq!(registry.publish("u2", &payload(json)), 0);
        assert_eq!(c1.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn every_device_of_a_user_gets_a_copy_until_it_unsubscribes() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (mut c1, c1_token) = registry.subscribe("u1".to_string());
        let (mut c2, _c2_token) = registry.subscribe("u1".to_string());

        assert_eq!(registry.publish("u1", &payload("X")), 2);
        assert_eq!(&*c1.try_recv().unwrap(), "X");
        assert_eq!(&*c2.try_recv().unwrap(), "X");

        c1_token.release();
        assert_eq!(registry.publish("u1", &payload("Y")), 1);
        assert_eq!(&*c2.try_recv().unwrap(), "Y");
        assert_eq!(c1.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[test]
    fn full_queue_drops_new_payloads_for_that_connection_only() {
        let registry = Arc::new(ConnectionRegistry::new(2));
        let (mut slow, _slow_token) = registry.subscribe("u1".to_string());
        let (mut fast, _fast_token) = registry.subscribe("u1".to_string());

        registry.publish("u1", &payload("1"));
        assert_eq!(&*fast.try_recv().unwrap(), "1");
        registry.publish("u1", &payload("2"));
        assert_eq!(&*fast.try_recv().unwrap(), "2");

        // `slow` now holds two payloads and is at capacity
        assert_eq!(registry.publish("u1", &payload("3")), 1);
        assert_eq!(&*fast.try_recv().unwrap(), "3");

        assert_eq!(&*slow.try_recv().unwrap(), "1");
        assert_eq!(&*slow.try_recv().unwrap(), "2");
        assert_eq!(slow.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn payloads_arrive_in_publish_order() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (mut rx, _token) = registry.subscribe("u1".to_string());

        for n in 0..5 {
            registry.publish("u1", &payload(&n.to_string()));
        }

        let received: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|p| p.to_string())
            .collect();
        assert_eq!(received, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn releasing_twice_leaves_other_connections_alone() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (_rx1, first) = registry.subscribe("u1".to_string());
        let (_rx2, _second) = registry.subscribe("u1".to_string());

        assert!(first.release());
        assert!(!first.release());
        assert_eq!(registry.subscriber_count("u1"), 1);
    }

    #[test]
    fn dropping_the_token_unregisters_and_closes_the_queue() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (mut rx, token) = registry.subscribe("u1".to_string());

        drop(token);

        assert_eq!(registry.user_count(), 0);
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[test]
    fn close_all_disconnects_everyone_and_refuses_newcomers() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let (mut a, _a_token) = registry.subscribe("u1".to_string());
        let (mut b, _b_token) = registry.subscribe("u2".to_string());

        assert_eq!(registry.close_all(), 2);
        assert_eq!(registry.user_count(), 0);
        assert_eq!(a.try_recv().unwrap_err(), TryRecvError::Disconnected);
        assert_eq!(b.try_recv().unwrap_err(), TryRecvError::Disconnected);

        let (mut late, late_token) = registry.subscribe("u3".to_string());
        assert_eq!(registry.user_count(), 0);
        assert_eq!(late.try_recv().unwrap_err(), TryRecvError::Disconnected);
        assert!(!late_token.release());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_churn_leaves_no_empty_entries() {
        let registry = Arc::new(ConnectionRegistry::new(8));

        let mut tasks = Vec::new();
        for n in 0..32 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let user_id = format!("u{}", n % 4);
                for _ in 0..50 {
                    let (_rx, token) = registry.subscribe(user_id.clone());
                    registry.publish(&user_id, &payload("tick"));
                    token.release();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.user_count(), 0);
    }
}
