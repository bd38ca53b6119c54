//! Service-wide constants and defaults.

/// Maximum accepted upload payload, in MiB.
pub const MAX_UPLOAD_SIZE_MB: usize = 10;

/// Admissions allowed per client address inside one rate-limit window.
pub const UPLOAD_RATE_LIMIT_MAX: usize = 5;

/// Length of the sliding rate-limit window, in seconds.
pub const UPLOAD_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Upper bound on client addresses tracked by the rate limiter before an inline sweep.
pub const RATE_LIMIT_MAX_TRACKED_CLIENTS: usize = 10_000;

/// Interval between background sweeps of expired rate-limit windows.
pub const RATE_LIMIT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Capacity of the upload queue between ingestion and the worker.
pub const UPLOAD_QUEUE_CAPACITY: usize = 100;

/// How long an upload may wait for queue space before the caller is told to retry.
pub const ENQUEUE_TIMEOUT_MS: u64 = 2_000;

/// Directory under the storage root that receives accepted uploads.
pub const UPLOADS_DIR: &str = "uploads";

/// Multipart form field carrying the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Maximum length of a stored filename (before the upload id prefix).
pub const MAX_FILENAME_LENGTH: usize = 200;
