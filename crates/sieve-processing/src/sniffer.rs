use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

const EXECUTABLE_SIGNATURE: [u8; 2] = [0x4D, 0x5A]; // "MZ"
const PDF_SIGNATURE: [u8; 4] = [0x25, 0x50, 0x44, 0x46]; // "%PDF"
const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04]; // "PK\x03\x04", also DOCX/XLSX
const TEXT_RANGE: std::ops::RangeInclusive<u8> = 0x09..=0x7F;

/// Bytes needed before any format decision is made.
const MIN_SNIFF_LEN: usize = 4;

/// Formats accepted by the magic-byte sniffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedFormat {
    Pdf,
    Jpeg,
    /// ZIP container, which includes Office Open XML documents
    Zip,
    /// Heuristic: the leading bytes are all printable ASCII or common whitespace
    Text,
}

impl Display for DetectedFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DetectedFormat::Pdf => write!(f, "pdf"),
            DetectedFormat::Jpeg => write!(f, "jpeg"),
            DetectedFormat::Zip => write!(f, "zip"),
            DetectedFormat::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("content shorter than {MIN_SNIFF_LEN} bytes")]
    TooShort,

    #[error("executable signature (MZ) detected")]
    ExecutableSignature,

    #[error("content matches no accepted signature")]
    UnknownSignature,
}

/// Outcome of classifying an upload's leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted(DetectedFormat),
    Rejected(RejectReason),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }
}

/// Fast executable pre-check for the ingestion path.
///
/// Looks at the first two bytes of a borrowed prefix only; the caller's buffer is left
/// untouched for the full classification that runs later.
pub fn is_executable_signature(prefix: &[u8]) -> bool {
    prefix.starts_with(&EXECUTABLE_SIGNATURE)
}

/// Classify content by its leading bytes. Rules are checked in order, first match wins.
///
/// Pure and total: the same bytes always give the same answer and no input panics.
pub fn classify(content: &[u8]) -> Classification {
    if content.len() < MIN_SNIFF_LEN {
        return Classification::Rejected(RejectReason::TooShort);
    }

    if is_executable_signature(content) {
        return Classification::Rejected(RejectReason::ExecutableSignature);
    }

    let header = &content[..MIN_SNIFF_LEN];

    if header == PDF_SIGNATURE {
        return Classification::Accepted(DetectedFormat::Pdf);
    }

    if header.starts_with(&JPEG_SIGNATURE) {
        return Classification::Accepted(DetectedFormat::Jpeg);
    }

    if header == ZIP_SIGNATURE {
        return Classification::Accepted(DetectedFormat::Zip);
    }

    if header.iter().all(|b| TEXT_RANGE.contains(b)) {
        return Classification::Accepted(DetectedFormat::Text);
    }

    Classification::Rejected(RejectReason::UnknownSignature)
}

/// Content classification hook used by the upload worker.
///
/// The magic-byte sniffer is a narrow heuristic, not malware detection. A stronger
/// scanner can be plugged in by implementing this trait.
pub trait ContentClassifier: Send + Sync {
    fn classify(&self, content: &[u8]) -> Classification;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Default classifier backed by [`classify`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicByteSniffer;

impl ContentClassifier for MagicByteSniffer {
    fn classify(&self, content: &[u8]) -> Classification {
        let classification = classify(content);
        if let Classification::Rejected(reason) = classification {
            tracing::debug!(
                reason = %reason,
                size_bytes = content.len(),
                "Magic-byte sniff rejected content"
            );
        }
        classification
    }

    fn name(&self) -> &'static str {
        "magic-bytes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_inputs_always_reject() {
        assert_eq!(classify(&[]), Classification::Rejected(RejectReason::TooShort));
        assert_eq!(
            classify(&[0x25, 0x50, 0x44]),
            Classification::Rejected(RejectReason::TooShort)
        );
        // Even a JPEG prefix is too short on its own
        assert_eq!(
            classify(&[0xFF, 0xD8]),
            Classification::Rejected(RejectReason::TooShort)
        );
    }

    #[test]
    fn test_executable_signature_rejects_regardless_of_tail() {
        assert_eq!(
            classify(&[0x4D, 0x5A, 0x90, 0x00]),
            Classification::Rejected(RejectReason::ExecutableSignature)
        );
        // "MZ" followed by printable text would otherwise pass the text heuristic
        assert_eq!(
            classify(b"MZ hello world"),
            Classification::Rejected(RejectReason::ExecutableSignature)
        );
    }

    #[test]
    fn test_accepted_signatures() {
        assert_eq!(
            classify(&[0x25, 0x50, 0x44, 0x46, 0x2D, 0x31]),
            Classification::Accepted(DetectedFormat::Pdf)
        );
        assert_eq!(
            classify(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Classification::Accepted(DetectedFormat::Jpeg)
        );
        assert_eq!(
            classify(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Classification::Accepted(DetectedFormat::Zip)
        );
        assert_eq!(
            classify(b"hello\n"),
            Classification::Accepted(DetectedFormat::Text)
        );
    }

    #[test]
    fn test_text_heuristic_bounds_are_inclusive() {
        assert!(classify(&[0x09, 0x7F, 0x09, 0x7F]).is_accepted());
        assert_eq!(
            classify(&[0x08, 0x41, 0x41, 0x41]),
            Classification::Rejected(RejectReason::UnknownSignature)
        );
        assert_eq!(
            classify(&[0x41, 0x41, 0x41, 0x80]),
            Classification::Rejected(RejectReason::UnknownSignature)
        );
    }

    #[test]
    fn test_text_heuristic_only_inspects_first_four_bytes() {
        assert!(classify(&[0x41, 0x42, 0x43, 0x44, 0x00, 0xFF]).is_accepted());
    }

    #[test]
    fn test_unknown_binary_rejects() {
        assert_eq!(
            classify(&[0x00, 0x01, 0x02, 0x03]),
            Classification::Rejected(RejectReason::UnknownSignature)
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let inputs: [&[u8]; 4] = [b"%PDF-1.7", &[0x00, 0x01, 0x02, 0x03], b"MZ", b"text"];
        for input in inputs {
            assert_eq!(classify(input), classify(input));
        }
    }

    #[test]
    fn test_executable_precheck_reads_only_prefix() {
        let content = vec![0x4D, 0x5A, 0x01, 0x02];
        assert!(is_executable_signature(&content));
        assert!(!is_executable_signature(&[0x4D]));
        assert!(!is_executable_signature(&[0x5A, 0x4D]));
        // Buffer is unchanged for the later full read
        assert_eq!(content, vec![0x4D, 0x5A, 0x01, 0x02]);
    }

    #[test]
    fn test_magic_byte_sniffer_delegates_to_classify() {
        let sniffer = MagicByteSniffer;
        assert_eq!(sniffer.name(), "magic-bytes");
        assert_eq!(
            sniffer.classify(&[0xFF, 0xD8, 0x00, 0x00]),
            Classification::Accepted(DetectedFormat::Jpeg)
        );
    }
}
