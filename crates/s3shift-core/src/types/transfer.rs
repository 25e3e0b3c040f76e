//! Transfer outcomes

use serde::Serialize;
use std::fmt;

use crate::Error;

/// How the destination object was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CopyMode {
    /// One `CopyObject` request
    SingleShot,
    /// A finalized multipart session
    Multipart { upload_id: String, parts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub bytes: u64,
    #[serde(flatten)]
    pub mode: CopyMode,
}

impl TransferSummary {
    pub fn part_count(&self) -> u32 {
        match &self.mode {
            CopyMode::SingleShot => 1,
            CopyMode::Multipart { parts, .. } => *parts,
        }
    }
}

/// Terminal result of one transfer
#[derive(Debug)]
pub enum TransferOutcome {
    Success(TransferSummary),
    /// Source object is empty; nothing was written
    NoData,
    /// The error is carried for logging, not for retry
    Failure(Error),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TransferOutcome::Failure(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Success(_) => "Success",
            TransferOutcome::NoData => "NoData",
            TransferOutcome::Failure(_) => "Failure",
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            TransferOutcome::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Success(summary) => write!(
                f,
                "Success ({} bytes in {} part(s))",
                summary.bytes,
                summary.part_count()
            ),
            TransferOutcome::NoData => write!(f, "NoData"),
            TransferOutcome::Failure(e) => write!(f, "Failure: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let ok = TransferOutcome::Success(TransferSummary {
            bytes: 12,
            mode: CopyMode::Multipart {
                upload_id: "u-1".into(),
                parts: 3,
            },
        });
        assert!(ok.is_success());
        assert_eq!(ok.to_string(), "Success (12 bytes in 3 part(s))");

        let failed = TransferOutcome::Failure(Error::NotFound("s3://b/k".into()));
        assert!(failed.is_failure());
        assert_eq!(failed.as_str(), "Failure");
        assert_eq!(failed.error().map(|e| e.code()), Some("NotFound"));

        assert_eq!(TransferOutcome::NoData.to_string(), "NoData");
        assert!(TransferOutcome::NoData.error().is_none());
    }

    #[test]
    fn test_summary_serialization() {
        let summary = TransferSummary {
            bytes: 3,
            mode: CopyMode::SingleShot,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "single_shot");
        assert_eq!(json["bytes"], 3);
        assert_eq!(summary.part_count(), 1);
    }
}
