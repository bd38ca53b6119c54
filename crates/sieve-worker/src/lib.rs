//! Background half of the upload pipeline.
//!
//! The ingestion handler records a `Pending` status and enqueues an [`UploadTask`] on the
//! bounded [`UploadQueue`]. A single [`UploadWorker`] drains the queue in FIFO order,
//! classifies each upload and persists the accepted ones, recording every step in the
//! shared [`StatusStore`].
//!
//! [`UploadTask`]: sieve_core::UploadTask

pub mod queue;
pub mod status;
pub mod worker;

pub use queue::{EnqueueError, UploadQueue};
pub use status::{StatusEntry, StatusStore, TransitionError};
pub use worker::UploadWorker;
