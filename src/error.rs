//! Error types shared by every layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    /// A planning precondition was violated (non-positive duration, size or
    /// target, or fewer than two parts).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The probe could not determine the duration or size of the source.
    #[error("Could not determine video {0}")]
    MetadataUnavailable(String),

    /// The external cut command failed for `part` (1-based).
    #[error("Segment cutting failed at part {part}: {diagnostic}")]
    SegmentCutFailed { part: usize, diagnostic: String },

    /// ffmpeg is neither bundled nor available on the PATH.
    #[error("{0} not found. Please ensure it is installed or included in the assets folder.")]
    ExternalToolMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SplitResult<T> = Result<T, SplitError>;

impl SplitError {
    /// The failing part number, when the error comes from a segment cut.
    pub fn failed_part(&self) -> Option<usize> {
        match self {
            SplitError::SegmentCutFailed { part, .. } => Some(*part),
            _ => None,
        }
    }
}
