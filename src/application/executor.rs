use crate::config::DEFAULT_EXTENSION;
use crate::domain::layout::{output_extension, part_file_name};
use crate::domain::SegmentationPlan;
use crate::error::{SplitError, SplitResult};
use crate::ports::{CutRequest, ProgressSink, SegmentCutter};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Result of one run. Parts written before a failure are kept on disk and
/// listed in `written`.
#[derive(Debug)]
pub enum RunOutcome {
    Completed { parts: Vec<PathBuf> },
    Failed {
        written: Vec<PathBuf>,
        error: SplitError,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Files produced by the run, complete or not.
    pub fn written(&self) -> &[PathBuf] {
        match self {
            RunOutcome::Completed { parts } => parts,
            RunOutcome::Failed { written, .. } => written,
        }
    }

    pub fn into_result(self) -> SplitResult<Vec<PathBuf>> {
        match self {
            RunOutcome::Completed { parts } => Ok(parts),
            RunOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Cuts the segments of a plan one after the other.
///
/// Segment N+1 is only started once the command for segment N has exited.
/// The first failure ends the run; nothing is retried or rolled back.
pub struct SegmentExecutor<C> {
    cutter: C,
    default_extension: String,
}

impl<C> SegmentExecutor<C>
where
    C: SegmentCutter,
{
    pub fn new(cutter: C) -> Self {
        Self {
            cutter,
            default_extension: String::from(DEFAULT_EXTENSION),
        }
    }

    /// Extension given to parts when the source has none.
    pub fn with_default_extension(mut self, ext: impl Into<String>) -> Self {
        self.default_extension = ext.into();
        self
    }

    pub fn cutter(&self) -> &C {
        &self.cutter
    }

    /// Write every segment of `plan` into `output_dir` as `part_NNN.ext`.
    /// `output_dir` must already exist.
    pub async fn execute(
        &self,
        plan: &SegmentationPlan,
        source: &Path,
        output_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> RunOutcome {
        let total = plan.len();
        if total == 0 {
            return RunOutcome::Failed {
                written: Vec::new(),
                error: SplitError::InvalidParameter("plan contains no segments".to_string()),
            };
        }

        let ext = output_extension(source, &self.default_extension);
        let mut written = Vec::with_capacity(total);

        info!(
            "Cutting {} into {} parts under {}",
            source.display(),
            total,
            output_dir.display()
        );

        for segment in plan.iter() {
            let part = segment.part_number();
            progress.report(&format!("Processing part {} of {}", part, total));

            let destination = output_dir.join(part_file_name(part, &ext));
            let request = CutRequest {
                source: source.to_path_buf(),
                start_offset_seconds: segment.start_offset_seconds,
                length_seconds: segment.length_seconds,
                destination: destination.clone(),
            };

            let diagnostic = match self.cutter.cut(&request).await {
                Ok(output) if output.success => {
                    debug!("Part {} written to {:?}", part, destination);
                    written.push(destination);
                    continue;
                }
                Ok(output) => output.diagnostic,
                Err(e) => format!("could not run cut command: {}", e),
            };

            error!("Error cutting part {}: {}", part, diagnostic);
            progress.report(&format!("Error processing part {}", part));

            return RunOutcome::Failed {
                written,
                error: SplitError::SegmentCutFailed { part, diagnostic },
            };
        }

        info!("All {} parts written", total);
        RunOutcome::Completed { parts: written }
    }
}
