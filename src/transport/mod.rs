//! Pub/sub and registration seams.
//!
//! The runtime only talks to the message bus through [`Transport`] and to
//! the service directory through [`Registrar`]. [`InMemoryTransport`]
//! implements both inside one process, encoding every message to its wire
//! form on the way through.

mod memory;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::errors::TransportError;
use crate::name::CanonicalName;
use crate::protocol::{Message, Topic};

pub use memory::{InMemoryTransport, TransportStats};

/// Stream of messages published on topics matching a subscription.
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    pub fn new(topic: Topic, receiver: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { topic, receiver }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Next message, or `None` once the transport has shut down.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, message: Message) -> Result<(), TransportError>;

    async fn subscribe(&self, topic: Topic) -> Result<Subscription, TransportError>;

    /// Publish `message` with a fresh reply topic and wait for the answer.
    ///
    /// On timeout the caller stops waiting; whatever the receiver does with
    /// the request is unaffected.
    async fn request(&self, message: Message, timeout: Duration) -> Result<Message, TransportError>;
}

/// Directory entry for a deployed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, name: &CanonicalName, description: &str) -> Result<(), TransportError>;

    async fn unregister(&self, name: &CanonicalName) -> Result<(), TransportError>;

    /// Registrations whose name falls under `prefix` (a DPE or container).
    async fn find(&self, prefix: &CanonicalName) -> Result<Vec<Registration>, TransportError>;
}
