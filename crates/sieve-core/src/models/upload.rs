use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of an accepted upload.
///
/// States only move forward:
/// `Pending -> Scanning -> (Processing | VirusDetected)`, then `Processing -> (Completed | Failed)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Pending,
    Scanning,
    Processing,
    Completed,
    Failed,
    VirusDetected,
}

impl UploadStatus {
    /// Terminal states are never left once reached.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadStatus::Completed | UploadStatus::Failed | UploadStatus::VirusDetected
        )
    }

    /// Whether moving from `self` to `next` is a legal step of the lifecycle.
    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        use UploadStatus::*;
        matches!(
            (self, next),
            (Pending, Scanning)
                | (Scanning, Processing)
                | (Scanning, VirusDetected)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "Pending",
            UploadStatus::Scanning => "Scanning",
            UploadStatus::Processing => "Processing",
            UploadStatus::Completed => "Completed",
            UploadStatus::Failed => "Failed",
            UploadStatus::VirusDetected => "VirusDetected",
        }
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(UploadStatus::Pending),
            "Scanning" => Ok(UploadStatus::Scanning),
            "Processing" => Ok(UploadStatus::Processing),
            "Completed" => Ok(UploadStatus::Completed),
            "Failed" => Ok(UploadStatus::Failed),
            "VirusDetected" => Ok(UploadStatus::VirusDetected),
            _ => Err(anyhow::anyhow!("Invalid upload status: {}", s)),
        }
    }
}

/// How declared filenames are turned into stored filenames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenamePolicy {
    /// Allowlisted characters, traversal rejected, stored name prefixed with the upload id.
    #[default]
    Strict,
    /// Blacklist stripping of `..`, `//`, `\` and `:`; same-named uploads overwrite each other.
    Legacy,
}

impl FromStr for FilenamePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(FilenamePolicy::Strict),
            "legacy" => Ok(FilenamePolicy::Legacy),
            other => Err(anyhow::anyhow!(
                "FILENAME_POLICY must be 'strict' or 'legacy', got '{}'",
                other
            )),
        }
    }
}

/// A validated upload travelling from ingestion to the worker.
///
/// Built once after every synchronous check has passed and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub content: Bytes,
    pub sanitized_name: String,
    pub simulate_scan: bool,
    pub scan_delay: Duration,
    pub storage_path: PathBuf,
}

impl UploadTask {
    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Opaque identifier to poll with `GET /status/{id}`
    pub processing_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: UploadStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_are_allowed() {
        use UploadStatus::*;
        assert!(Pending.can_transition_to(Scanning));
        assert!(Scanning.can_transition_to(Processing));
        assert!(Scanning.can_transition_to(VirusDetected));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
    }

    #[test]
    fn test_skips_and_regressions_are_rejected() {
        use UploadStatus::*;
        assert!(!Pending.can_transition_to(Processing));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Scanning));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!VirusDetected.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(UploadStatus::Completed.is_terminal());
        assert!(UploadStatus::Failed.is_terminal());
        assert!(UploadStatus::VirusDetected.is_terminal());
        assert!(!UploadStatus::Pending.is_terminal());
        assert!(!UploadStatus::Scanning.is_terminal());
        assert!(!UploadStatus::Processing.is_terminal());
    }

    #[test]
    fn test_status_serializes_as_pascal_case() {
        let json = serde_json::to_string(&UploadStatus::VirusDetected).unwrap();
        assert_eq!(json, "\"VirusDetected\"");
        assert_eq!(
            "VirusDetected".parse::<UploadStatus>().unwrap(),
            UploadStatus::VirusDetected
        );
        assert!("virus_detected".parse::<UploadStatus>().is_err());
    }

    #[test]
    fn test_upload_response_uses_processing_id_key() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(UploadResponse { processing_id: id }).unwrap();
        assert_eq!(value["processingId"], id.to_string());
    }

    #[test]
    fn test_filename_policy_parsing() {
        assert_eq!(
            "STRICT".parse::<FilenamePolicy>().unwrap(),
            FilenamePolicy::Strict
        );
        assert_eq!(
            "legacy".parse::<FilenamePolicy>().unwrap(),
            FilenamePolicy::Legacy
        );
        assert!("lenient".parse::<FilenamePolicy>().is_err());
    }
}
