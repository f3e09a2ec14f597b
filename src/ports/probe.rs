use crate::domain::VideoMetadata;
use crate::error::SplitResult;
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Duration and size of the video at `path`.
    /// Fails with `MetadataUnavailable` when either cannot be determined.
    async fn probe(&self, path: &Path) -> SplitResult<VideoMetadata>;
}
