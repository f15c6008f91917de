use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::PoolError;

/// A fixed number of tasks draining one bounded job queue.
///
/// `submit` waits while the queue is full, so a saturated service slows the
/// loop feeding it instead of accumulating unbounded work.
pub struct WorkerPool<J> {
    sender: mpsc::Sender<J>,
    workers: Vec<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl<J: Send + 'static> WorkerPool<J> {
    pub fn spawn<F, Fut>(size: usize, queue_capacity: usize, handler: F) -> Self
    where
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);
        let cancellation_token = CancellationToken::new();

        let workers = (0..size.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);
                let token = cancellation_token.clone();
                tokio::spawn(async move {
                    loop {
                        let job = tokio::select! {
                            _ = token.cancelled() => break,
                            job = async { receiver.lock().await.recv().await } => job,
                        };
                        match job {
                            Some(job) => handler(job).await,
                            None => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            sender,
            workers,
            cancellation_token,
        }
    }

    /// Queue a job, waiting for room when the queue is full.
    pub async fn submit(&self, job: J) -> Result<(), PoolError> {
        self.sender.send(job).await.map_err(|_| PoolError::Closed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Stop taking jobs and wait for running ones to finish. Queued jobs
    /// that no worker picked up are dropped.
    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
