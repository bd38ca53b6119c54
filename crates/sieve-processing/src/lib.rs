//! Sieve Processing Library
//!
//! Content classification for uploaded bytes. The default classifier is a magic-byte
//! sniffer; anything implementing [`ContentClassifier`] can replace it.

pub mod sniffer;

pub use sniffer::{
    classify, is_executable_signature, Classification, ContentClassifier, DetectedFormat,
    MagicByteSniffer, RejectReason,
};
