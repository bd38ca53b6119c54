//! Single background worker that drains the upload queue.
//!
//! Per task: `Scanning`, optional simulated scan delay, classification, then either
//! `VirusDetected` or `Processing` followed by a write to disk and `Completed`/`Failed`.
//!
//! Shutdown: cancelling the token cuts an in-progress scan delay short, lets the
//! current task reach a terminal state, then stops. Tasks still waiting in the queue
//! are dropped and keep their `Pending` status.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use sieve_core::{UploadStatus, UploadTask};
use sieve_processing::{Classification, ContentClassifier, MagicByteSniffer};
use sieve_storage::{LocalStorage, Storage};

use crate::status::StatusStore;

#[derive(Clone)]
pub struct UploadWorker {
    status_store: StatusStore,
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn ContentClassifier>,
}

impl UploadWorker {
    pub fn new(
        status_store: StatusStore,
        storage: Arc<dyn Storage>,
        classifier: Arc<dyn ContentClassifier>,
    ) -> Self {
        Self {
            status_store,
            storage,
            classifier,
        }
    }

    /// Worker backed by the local filesystem and the magic-byte sniffer.
    pub fn with_defaults(status_store: StatusStore) -> Self {
        Self::new(
            status_store,
            Arc::new(LocalStorage::new()),
            Arc::new(MagicByteSniffer),
        )
    }

    /// Process tasks one at a time until `shutdown` fires or every sender is gone.
    pub async fn run(self, mut receiver: mpsc::Receiver<UploadTask>, shutdown: CancellationToken) {
        tracing::info!(classifier = self.classifier.name(), "Upload worker started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Upload worker shutting down");
                    break;
                }
                task = receiver.recv() => match task {
                    Some(task) => self.process_isolated(task, &shutdown).await,
                    None => {
                        tracing::info!("Upload queue closed, worker exiting");
                        break;
                    }
                }
            }
        }

        receiver.close();
        let mut dropped = 0usize;
        while let Ok(task) = receiver.try_recv() {
            tracing::debug!(upload_id = %task.id, "Dropping queued upload on shutdown");
            dropped += 1;
        }

        tracing::info!(dropped_tasks = dropped, "Upload worker stopped");
    }

    /// Run one task on its own tokio task so a panic is contained and recorded as
    /// `Failed` instead of taking the worker loop down.
    async fn process_isolated(&self, task: UploadTask, shutdown: &CancellationToken) {
        let id = task.id;
        let worker = self.clone();
        let shutdown = shutdown.clone();

        let result = tokio::spawn(async move { worker.process(task, &shutdown).await }).await;

        if let Err(e) = result {
            tracing::error!(upload_id = %id, error = %e, "Upload processing aborted");
            // Forced write: the task may have died in any non-terminal state.
            self.status_store.set(id, UploadStatus::Failed);
        }
    }

    /// Drive a single upload to a terminal state. Never returns an error: every
    /// failure is logged and recorded as a status.
    pub async fn process(&self, task: UploadTask, shutdown: &CancellationToken) {
        let span = tracing::info_span!(
            "process_upload",
            upload_id = %task.id,
            size_bytes = task.size_bytes(),
        );

        async move {
            let id = task.id;
            self.transition(id, UploadStatus::Scanning);

            if task.simulate_scan && !task.scan_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(task.scan_delay) => {}
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Scan delay cut short by shutdown");
                    }
                }
            }

            match self.classifier.classify(&task.content) {
                Classification::Rejected(reason) => {
                    tracing::warn!(
                        reason = %reason,
                        classifier = self.classifier.name(),
                        "Upload rejected by content classification"
                    );
                    self.transition(id, UploadStatus::VirusDetected);
                    return;
                }
                Classification::Accepted(format) => {
                    tracing::debug!(format = %format, "Upload classified");
                    self.transition(id, UploadStatus::Processing);
                }
            }

            match self
                .storage
                .store(&task.storage_path, &task.sanitized_name, task.content.clone())
                .await
            {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "Upload stored");
                    self.transition(id, UploadStatus::Completed);
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        directory = %task.storage_path.display(),
                        filename = %task.sanitized_name,
                        "Failed to store upload"
                    );
                    self.transition(id, UploadStatus::Failed);
                }
            }
        }
        .instrument(span)
        .await
    }

    fn transition(&self, id: Uuid, next: UploadStatus) {
        match self.status_store.advance(id, next) {
            Ok(previous) => {
                tracing::info!(from = %previous, status = %next, "Upload status updated");
            }
            Err(e) => {
                // Entry was missing or out of step; record the worker's view anyway.
                tracing::warn!(error = %e, to = %next, "Unexpected status transition");
                self.status_store.set(id, next);
            }
        }
    }
}
