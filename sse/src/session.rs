use crate::connection::{Payload, Unsubscribe};
use async_stream::stream;
use futures::Stream;
use log::*;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Comment written once when a stream opens, before any event.
pub const CONNECTED_COMMENT: &str = "connected";

/// Comment written on every heartbeat tick.
pub const HEARTBEAT_COMMENT: &str = "ping";

/// One unit written to the client, independent of the HTTP framework doing the writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Rendered as `: <text>\n\n`
    Comment(&'static str),
    /// Rendered as `data: <payload>\n\n`
    Data(Payload),
}

/// A single client's long-lived event stream.
///
/// Owns the receiving end of one registered connection. The connection is unregistered
/// exactly once, whether the stream ends because the client went away (the stream is
/// dropped) or because the hub closed the channel.
pub struct Session {
    receiver: Receiver<Payload>,
    unsubscribe: Unsubscribe,
    heartbeat: Duration,
}

impl Session {
    pub fn new(receiver: Receiver<Payload>, unsubscribe: Unsubscribe, heartbeat: Duration) -> Self {
        Self {
            receiver,
            unsubscribe,
            heartbeat,
        }
    }

    pub fn user_id(&self) -> &str {
        self.unsubscribe.user_id()
    }

    /// Yields the connected comment, then payloads as they arrive interleaved with heartbeat
    /// comments, and ends once the channel is closed.
    pub fn into_stream(self) -> impl Stream<Item = Frame> + Send + 'static {
        let Session {
            mut receiver,
            unsubscribe,
            heartbeat,
        } = self;

        stream! {
            yield Frame::Comment(CONNECTED_COMMENT);

            let mut ticker = time::interval_at(Instant::now() + heartbeat, heartbeat);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let next = tokio::select! {
                    payload = receiver.recv() => payload.map(Frame::Data),
                    _ = ticker.tick() => Some(Frame::Comment(HEARTBEAT_COMMENT)),
                };

                match next {
                    Some(frame) => yield frame,
                    None => break,
                }
            }

            debug!(
                "SSE channel closed by the hub for connection {}",
                unsubscribe.connection_id().as_str()
            );
            unsubscribe.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionRegistry;
    use futures::StreamExt;
    use std::sync::Arc;

    const HEARTBEAT: Duration = Duration::from_secs(25);

    fn open(registry: &Arc<ConnectionRegistry>, user_id: &str) -> Session {
        let (receiver, unsubscribe) = registry.subscribe(user_id.to_string());
        Session::new(receiver, unsubscribe, HEARTBEAT)
    }

    #[tokio::test(start_paused = true)]
    async fn stream_opens_with_connected_comment_then_forwards_payloads() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let stream = open(&registry, "u1").into_stream();
        tokio::pin!(stream);

        assert_eq!(stream.next().await, Some(Frame::Comment(CONNECTED_COMMENT)));

        registry.publish("u1", &Payload::from("{\"n\":1}"));
        assert_eq!(
            stream.next().await,
            Some(Frame::Data(Payload::from("{\"n\":1}")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn idle_stream_emits_heartbeats_at_the_configured_interval() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let stream = open(&registry, "u1").into_stream();
        tokio::pin!(stream);
        stream.next().await;

        let start = Instant::now();
        assert_eq!(stream.next().await, Some(Frame::Comment(HEARTBEAT_COMMENT)));
        assert!(start.elapsed() >= HEARTBEAT);

        assert_eq!(stream.next().await, Some(Frame::Comment(HEARTBEAT_COMMENT)));
        assert!(start.elapsed() >= HEARTBEAT * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn events_for_other_users_never_appear() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let stream = open(&registry, "u1").into_stream();
        tokio::pin!(stream);
        stream.next().await;

        registry.publish("u2", &Payload::from("not for u1"));

        let next = time::timeout(Duration::from_secs(1), stream.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_hub_ends_the_stream_and_unregisters() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let stream = open(&registry, "u1").into_stream();
        tokio::pin!(stream);
        stream.next().await;

        registry.close_all();

        assert_eq!(stream.next().await, None);
        assert_eq!(registry.subscriber_count("u1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_unregisters_the_connection() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let mut stream = Box::pin(open(&registry, "u1").into_stream());
        stream.next().await;
        assert_eq!(registry.subscriber_count("u1"), 1);

        drop(stream);

        assert_eq!(registry.subscriber_count("u1"), 0);
        assert_eq!(registry.user_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_an_unpolled_session_unregisters_the_connection() {
        let registry = Arc::new(ConnectionRegistry::new(8));
        let session = open(&registry, "u1");
        assert_eq!(session.user_id(), "u1");

        drop(session);

        assert_eq!(registry.user_count(), 0);
    }
}
