// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Registrar, Registration, Subscription, Transport};
use crate::errors::TransportError;
use crate::name::CanonicalName;
use crate::protocol::{Message, Topic};

/// Traffic counters of an [`InMemoryTransport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub messages: u64,
    /// Encoded size of everything published, envelope included.
    pub bytes: u64,
    /// Payload bytes alone.
    pub payload_bytes: u64,
}

/// Single-process bus and directory.
///
/// Messages go through the wire encoding on every publish so size counters
/// reflect what a network hop would carry.
#[derive(Default)]
pub struct InMemoryTransport {
    subscribers: RwLock<Vec<(Topic, mpsc::UnboundedSender<Message>)>>,
    registrations: RwLock<BTreeMap<String, Registration>>,
    next_reply: AtomicU64,
    messages: AtomicU64,
    bytes: AtomicU64,
    payload_bytes: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            messages: self.messages.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            payload_bytes: self.payload_bytes.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting traffic and end every open subscription.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.subscribers.write().clear();
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn publish(&self, message: Message) -> Result<(), TransportError> {
        self.ensure_open()?;
        let bytes = message.encode();
        let message = Message::decode(&bytes)?;

        self.messages.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes.len() as u64, Ordering::Relaxed);
        self.payload_bytes.fetch_add(message.data.len() as u64, Ordering::Relaxed);

        let mut stale = false;
        for (topic, sender) in self.subscribers.read().iter() {
            if topic.matches(&message.topic) && sender.send(message.clone()).is_err() {
                stale = true;
            }
        }
        if stale {
            self.subscribers.write().retain(|(_, sender)| !sender.is_closed());
        }
        Ok(())
    }

    async fn subscribe(&self, topic: Topic) -> Result<Subscription, TransportError> {
        self.ensure_open()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.write().push((topic.clone(), sender));
        Ok(Subscription::new(topic, receiver))
    }

    async fn request(&self, mut message: Message, timeout: Duration) -> Result<Message, TransportError> {
        let reply_topic = Topic::reply(self.next_reply.fetch_add(1, Ordering::Relaxed));
        let mut replies = self.subscribe(reply_topic.clone()).await?;
        message.meta.reply_to = Some(reply_topic.as_str().to_string());
        self.publish(message).await?;

        match tokio::time::timeout(timeout, replies.recv()).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(TransportError::Closed),
            Err(_) => Err(TransportError::Timeout {
                topic: reply_topic.to_string(),
                timeout,
            }),
        }
    }
}

#[async_trait]
impl Registrar for InMemoryTransport {
    async fn register(&self, name: &CanonicalName, description: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        let name = name.to_string();
        self.registrations.write().insert(
            name.clone(),
            Registration {
                name,
                description: description.to_string(),
            },
        );
        Ok(())
    }

    async fn unregister(&self, name: &CanonicalName) -> Result<(), TransportError> {
        self.registrations.write().remove(&name.to_string());
        Ok(())
    }

    async fn find(&self, prefix: &CanonicalName) -> Result<Vec<Registration>, TransportError> {
        let prefix = Topic::of(prefix);
        Ok(self
            .registrations
            .read()
            .values()
            .filter(|r| prefix.matches(&Topic::new(r.name.as_str())))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Meta;

    fn message(topic: &str, data: &str) -> Message {
        Message::new(Topic::new(topic), Meta::default(), data.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_prefix_subscription() {
        let transport = InMemoryTransport::new();
        let mut container = transport.subscribe(Topic::new("10.1.1.1_java:c")).await.unwrap();
        let mut s1 = transport.subscribe(Topic::new("10.1.1.1_java:c:S1")).await.unwrap();

        transport.publish(message("10.1.1.1_java:c:S10", "x")).await.unwrap();
        transport.publish(message("10.1.1.1_java:c:S1", "y")).await.unwrap();

        assert_eq!(container.recv().await.unwrap().data, b"x");
        assert_eq!(container.recv().await.unwrap().data, b"y");
        assert_eq!(s1.recv().await.unwrap().data, b"y");
        assert!(s1.try_recv().is_none());

        let stats = transport.stats();
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.payload_bytes, 2);
        assert!(stats.bytes > stats.payload_bytes);
    }

    #[tokio::test]
    async fn test_request_reply_and_timeout() {
        let transport = std::sync::Arc::new(InMemoryTransport::new());
        let mut service = transport.subscribe(Topic::new("echo")).await.unwrap();

        let responder = {
            let transport = std::sync::Arc::clone(&transport);
            tokio::spawn(async move {
                let request = service.recv().await.unwrap();
                let reply_to = request.meta.reply_to.clone().unwrap();
                transport.publish(message(&reply_to, "pong")).await.unwrap();
            })
        };

        let reply = transport
            .request(message("echo", "ping"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply.data, b"pong");
        responder.await.unwrap();

        let err = transport
            .request(message("nobody", "ping"), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_registrar_find_by_prefix() {
        let transport = InMemoryTransport::new();
        let s1: CanonicalName = "10.1.1.1_java:c:S1".parse().unwrap();
        let s2: CanonicalName = "10.1.1.1_java:d:S2".parse().unwrap();
        transport.register(&s1, "one").await.unwrap();
        transport.register(&s2, "two").await.unwrap();

        let container: CanonicalName = "10.1.1.1_java:c".parse().unwrap();
        let found = transport.find(&container).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "one");

        transport.unregister(&s1).await.unwrap();
        assert_eq!(transport.find(&s1.dpe_name()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_transport() {
        let transport = InMemoryTransport::new();
        let mut sub = transport.subscribe(Topic::new("t")).await.unwrap();
        transport.close();
        assert!(sub.recv().await.is_none());
        assert_eq!(
            transport.publish(message("t", "x")).await,
            Err(TransportError::Closed)
        );
    }
}
