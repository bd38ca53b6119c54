//! Sieve Storage Library
//!
//! Persistence for uploads that passed classification. The worker writes each accepted
//! upload to `{storage_root}/uploads/{stored_name}` through the [`Storage`] trait.
//!
//! Filenames handed to a backend must be a single path component: no separators and
//! no `..`. Backends reject anything else with [`StorageError::InvalidKey`].

#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
