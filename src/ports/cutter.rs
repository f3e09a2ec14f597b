use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

/// One stream-copy extraction: `[start, start + length)` of `source`, or
/// `[start, end)` when `length_seconds` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CutRequest {
    pub source: PathBuf,
    pub start_offset_seconds: f64,
    pub length_seconds: Option<f64>,
    pub destination: PathBuf,
}

/// What the external command reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutOutput {
    pub success: bool,
    /// Tool output worth showing when `success` is false
    pub diagnostic: String,
}

impl CutOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            diagnostic: String::new(),
        }
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Materializes one segment. Implementations must copy streams, never
/// re-encode, and overwrite any existing file at the destination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentCutter: Send + Sync {
    /// `Err` means the command could not be run at all; a command that ran
    /// and failed returns `Ok` with `success == false`.
    async fn cut(&self, request: &CutRequest) -> io::Result<CutOutput>;
}
