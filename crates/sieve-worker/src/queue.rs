//! Bounded upload queue.
//!
//! A fixed-capacity MPSC channel sits between the request handlers and the single
//! worker. When it is full, `enqueue` waits up to the configured timeout for a slot
//! and then gives up, which the API turns into a 503 so clients back off.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sieve_core::{Config, UploadTask};

use crate::worker::UploadWorker;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// No slot freed up within the enqueue timeout
    #[error("Upload queue is full")]
    Full,

    /// The worker has stopped and will never read again
    #[error("Upload queue is closed")]
    Closed,
}

#[derive(Clone)]
pub struct UploadQueue {
    sender: mpsc::Sender<UploadTask>,
    capacity: usize,
    enqueue_timeout: Duration,
}

impl UploadQueue {
    /// Create a queue and the receiving end to hand to a worker.
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> (Self, mpsc::Receiver<UploadTask>) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        (
            Self {
                sender,
                capacity,
                enqueue_timeout,
            },
            receiver,
        )
    }

    /// Create a queue sized from configuration and spawn `worker` to drain it until
    /// `shutdown` fires.
    pub fn start(
        config: &Config,
        worker: UploadWorker,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (queue, receiver) = Self::new(config.upload_queue_capacity(), config.enqueue_timeout());

        tracing::info!(
            capacity = queue.capacity,
            enqueue_timeout_ms = queue.enqueue_timeout.as_millis() as u64,
            "Upload queue started"
        );

        let handle = tokio::spawn(worker.run(receiver, shutdown));
        (queue, handle)
    }

    /// Hand a task to the worker, waiting up to the enqueue timeout for a free slot.
    #[tracing::instrument(skip(self, task), fields(upload_id = %task.id))]
    pub async fn enqueue(&self, task: UploadTask) -> Result<(), EnqueueError> {
        if self.enqueue_timeout.is_zero() {
            return self.sender.try_send(task).map_err(|e| match e {
                TrySendError::Full(_) => EnqueueError::Full,
                TrySendError::Closed(_) => EnqueueError::Closed,
            });
        }

        self.sender
            .send_timeout(task, self.enqueue_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => {
                    tracing::warn!(
                        capacity = self.capacity,
                        timeout_ms = self.enqueue_timeout.as_millis() as u64,
                        "Upload queue full, enqueue timed out"
                    );
                    EnqueueError::Full
                }
                SendTimeoutError::Closed(_) => EnqueueError::Closed,
            })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks currently waiting for the worker.
    pub fn depth(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
