// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::runtime::Service;
use crate::errors::{ServiceError, TransportError};
use crate::observability::messages::service::MessageDropped;
use crate::observability::messages::StructuredLog;
use crate::pool::WorkerPool;
use crate::protocol::{Message, Topic};
use crate::transport::Transport;

/// A running service: a listener feeding the service topic into a worker
/// pool sized like the engine pool.
///
/// The listener waits while the work queue is full, leaving further
/// messages queued at the transport.
pub struct ServiceHandle {
    service: Arc<Service>,
    listener: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ServiceHandle {
    pub async fn start(
        service: Arc<Service>,
        transport: Arc<dyn Transport>,
        queue_capacity: usize,
    ) -> Result<Self, TransportError> {
        let topic = Topic::of(service.name());
        let mut subscription = transport.subscribe(topic.clone()).await?;
        let workers = {
            let service = Arc::clone(&service);
            WorkerPool::spawn(service.engines().capacity(), queue_capacity, move |message: Message| {
                let service = Arc::clone(&service);
                async move {
                    let topic = message.topic.clone();
                    if let Err(e) = service.serve(message).await {
                        log_dropped(&service, &topic, &e);
                    }
                }
            })
        };

        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();
        let listener = tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    _ = token.cancelled() => break,
                    message = subscription.recv() => message,
                };
                let Some(message) = message else {
                    break;
                };
                if workers.submit(message).await.is_err() {
                    break;
                }
            }
            workers.shutdown().await;
        });

        Ok(Self {
            service,
            listener,
            cancellation_token,
        })
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Stop listening, let in-flight executions finish and close the engine
    /// pool.
    pub async fn stop(self) {
        self.cancellation_token.cancel();
        let _ = self.listener.await;
        self.service.engines().close();
    }
}

/// Engine, routing and composition failures are logged where they happen.
fn log_dropped(service: &Service, topic: &Topic, error: &ServiceError) {
    if matches!(
        error,
        ServiceError::Engine(_) | ServiceError::Routing(_) | ServiceError::Composition(_)
    ) {
        return;
    }
    MessageDropped {
        service: &service.name().to_string(),
        topic: topic.as_str(),
        error,
    }
    .log();
}
