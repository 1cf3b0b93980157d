use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Received {
    /// `: <text>` lines, i.e. the connected marker and heartbeats
    Comment(String),
    Event(Event),
}

#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub data: Value,
    pub timestamp: Instant,
}

pub struct Connection {
    pub user_label: String,
    rx: mpsc::UnboundedReceiver<Received>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, token: &str, user_label: String) -> Result<Self> {
        let url = format!("{}/api/events?token={}", base_url, token);
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?.build();

        let label = user_label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                let received = match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => match serde_json::from_str::<Value>(&event.data) {
                        Ok(data) => Received::Event(Event {
                            event_type: data["type"].as_str().unwrap_or_default().to_string(),
                            data,
                            timestamp: Instant::now(),
                        }),
                        Err(e) => {
                            warn!("Non-JSON event for {}: {}", label, e);
                            continue;
                        }
                    },
                    Some(Ok(es::SSE::Comment(comment))) => Received::Comment(comment.trim().to_string()),
                    Some(Err(e)) => {
                        warn!("SSE error for {}: {}", label, e);
                        continue;
                    }
                    None => {
                        debug!("SSE stream ended for {}", label);
                        break;
                    }
                };

                if tx.send(received).is_err() {
                    debug!("SSE receiver dropped for {}", label);
                    break;
                }
            }
        });

        Ok(Self {
            user_label,
            rx,
            _handle: handle,
        })
    }

    pub async fn wait_for_comment(&mut self, text: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.next_before(deadline).await? {
                Received::Comment(comment) if comment == text => return Ok(()),
                _ => continue,
            }
        }
    }

    pub async fn wait_for_event(&mut self, event_type: &str, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.next_before(deadline).await? {
                Received::Event(event) if event.event_type == event_type => return Ok(event),
                // Heartbeats and other event types, keep waiting
                _ => continue,
            }
        }
    }

    /// Succeeds if no event (comments don't count) arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        let deadline = Instant::now() + window;
        loop {
            match self.next_before(deadline).await {
                Ok(Received::Event(event)) => {
                    anyhow::bail!("Unexpected {} event: {}", event.event_type, event.data)
                }
                Ok(Received::Comment(_)) => continue,
                Err(_) => return Ok(()),
            }
        }
    }

    async fn next_before(&mut self, deadline: Instant) -> Result<Received> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            anyhow::bail!("Timeout");
        }

        match tokio::time::timeout(remaining, self.rx.recv()).await {
            Ok(Some(received)) => Ok(received),
            Ok(None) => anyhow::bail!("SSE connection closed"),
            Err(_) => anyhow::bail!("Timeout"),
        }
    }
}
