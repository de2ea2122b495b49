use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a candidate image was excluded during the filter phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Zero-byte file, rejected without opening it.
    EmptyFile,
    /// Mean brightness below the configured threshold.
    TooDark,
    /// The file could not be decoded (corrupt or truncated image).
    DecodeError(String),
    /// The run was interrupted before this file was checked.
    Interrupted,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "empty file"),
            Self::TooDark => write!(f, "too dark"),
            Self::DecodeError(msg) => write!(f, "decode error: {msg}"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Outcome of validity-checking one candidate source image.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Accepted(PathBuf),
    Rejected { path: PathBuf, reason: RejectReason },
}

/// Failure of a single batch. Never aborts sibling batches; tallied in the
/// run summary instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot parse capture timestamp from {}", path.display())]
    TimestampParse { path: PathBuf },

    #[error("no images could be loaded for this batch")]
    EmptyBatch,

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("remote image processor: {0}")]
    RemoteService(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_reject_reason_display() {
        assert_eq!(RejectReason::EmptyFile.to_string(), "empty file");
        assert_eq!(RejectReason::TooDark.to_string(), "too dark");
        assert_eq!(
            RejectReason::DecodeError("bad marker".to_string()).to_string(),
            "decode error: bad marker"
        );
    }

    #[test]
    fn test_batch_error_includes_path() {
        let err = BatchError::TimestampParse {
            path: Path::new("/img/snapshot.jpg").to_path_buf(),
        };
        assert!(err.to_string().contains("snapshot.jpg"));
    }
}
