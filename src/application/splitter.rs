use super::executor::{RunOutcome, SegmentExecutor};
use crate::domain::layout::default_output_dir;
use crate::domain::{plan, SegmentationPlan, SplitConfig, VideoMetadata};
use crate::error::{SplitError, SplitResult};
use crate::ports::{MediaProbe, ProgressSink, SegmentCutter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// What to split and how.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub source: PathBuf,
    pub config: SplitConfig,
    /// Defaults to `<stem>_parts` next to the source
    pub output_dir: Option<PathBuf>,
}

impl SplitRequest {
    pub fn new(source: impl Into<PathBuf>, config: SplitConfig) -> Self {
        Self {
            source: source.into(),
            config,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.source))
    }
}

/// A validated plan, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    pub metadata: VideoMetadata,
    pub plan: SegmentationPlan,
    pub output_dir: PathBuf,
}

/// A finished run.
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    pub parts: Vec<PathBuf>,
    pub plan: SegmentationPlan,
}

/// Probe, plan, then cut. One run at a time per call; nothing is shared
/// between runs.
pub struct SplitService<P, C> {
    probe: P,
    executor: SegmentExecutor<C>,
}

impl<P, C> SplitService<P, C>
where
    P: MediaProbe,
    C: SegmentCutter,
{
    pub fn new(probe: P, cutter: C) -> Self {
        Self {
            probe,
            executor: SegmentExecutor::new(cutter),
        }
    }

    pub fn with_default_extension(mut self, ext: impl Into<String>) -> Self {
        self.executor = self.executor.with_default_extension(ext);
        self
    }

    /// Probe the source and build its plan without touching the filesystem.
    pub async fn prepare(
        &self,
        request: &SplitRequest,
        progress: &dyn ProgressSink,
    ) -> SplitResult<PreparedSplit> {
        progress.report("Processing... Getting video information");
        if request.config.needs_size() {
            progress.report("Processing... Analyzing video properties");
        } else {
            progress.report("Processing... Analyzing video duration");
        }

        let metadata = self.probe.probe(&request.source).await?;
        check_metadata(&metadata, &request.config)?;

        let plan = plan(&metadata, &request.config)?;
        info!(
            "Planned {} parts for {} ({:.3}s, {} bytes)",
            plan.segment_count,
            request.source.display(),
            metadata.duration_seconds,
            metadata.size_bytes
        );

        Ok(PreparedSplit {
            metadata,
            plan,
            output_dir: request.resolved_output_dir(),
        })
    }

    /// Split `request.source`. Parts written before a failure are left in
    /// the output directory.
    pub async fn run(
        &self,
        request: &SplitRequest,
        progress: &dyn ProgressSink,
    ) -> SplitResult<SplitReport> {
        let prepared = self.prepare(request, progress).await?;
        tokio::fs::create_dir_all(&prepared.output_dir).await?;

        for message in cutting_messages(&prepared.plan) {
            progress.report(&message);
        }

        let outcome = self
            .executor
            .execute(
                &prepared.plan,
                &request.source,
                &prepared.output_dir,
                progress,
            )
            .await;

        match outcome {
            RunOutcome::Completed { parts } => Ok(SplitReport {
                output_dir: prepared.output_dir,
                parts,
                plan: prepared.plan,
            }),
            RunOutcome::Failed { written, error } => {
                if !written.is_empty() {
                    warn!(
                        "Keeping {} part(s) written before the failure in {}",
                        written.len(),
                        prepared.output_dir.display()
                    );
                }
                Err(error)
            }
        }
    }
}

impl<P, C> SplitService<P, C>
where
    P: MediaProbe + 'static,
    C: SegmentCutter + 'static,
{
    /// Run on a background task. `progress` is the only channel back to the
    /// caller until the handle resolves.
    pub fn spawn<S>(
        self: Arc<Self>,
        request: SplitRequest,
        progress: S,
    ) -> JoinHandle<SplitResult<SplitReport>>
    where
        S: ProgressSink + 'static,
    {
        tokio::spawn(async move { self.run(&request, &progress).await })
    }
}

fn check_metadata(metadata: &VideoMetadata, config: &SplitConfig) -> SplitResult<()> {
    if !metadata.duration_seconds.is_finite() || metadata.duration_seconds <= 0.0 {
        return Err(SplitError::MetadataUnavailable("duration".to_string()));
    }
    if config.needs_size() && metadata.size_bytes == 0 {
        return Err(SplitError::MetadataUnavailable("size".to_string()));
    }
    Ok(())
}

/// What the run is about to do, announced before the first part.
fn cutting_messages(plan: &SegmentationPlan) -> Vec<String> {
    match plan.config {
        SplitConfig::ByPartCount { .. } => {
            vec![String::from("Processing... Cutting video into equal parts")]
        }
        SplitConfig::ByTargetSize { target_size_mb } => vec![
            format!("Processing... Cutting video into {}MB parts", target_size_mb),
            format!(
                "Will create approximately {} parts of {}MB each",
                plan.segment_count, target_size_mb
            ),
        ],
        SplitConfig::ByTargetDuration {
            target_duration_seconds,
        } => {
            let minutes = target_duration_seconds / 60.0;
            vec![
                format!("Processing... Cutting video into {}min parts", minutes),
                format!(
                    "Will create approximately {} parts of {:.1} minutes each",
                    plan.segment_count, minutes
                ),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::cutter::MockSegmentCutter;
    use crate::ports::probe::MockMediaProbe;
    use crate::ports::CutOutput;
    use std::sync::Mutex;
    use tempfile::tempdir;

    const MB: u64 = 1024 * 1024;

    fn probe_returning(metadata: VideoMetadata) -> MockMediaProbe {
        let mut probe = MockMediaProbe::new();
        probe
            .expect_probe()
            .times(1)
            .returning(move |_| Ok(metadata));
        probe
    }

    fn idle_cutter() -> MockSegmentCutter {
        let mut cutter = MockSegmentCutter::new();
        cutter.expect_cut().never();
        cutter
    }

    #[tokio::test]
    async fn test_zero_duration_fails_before_planning() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("movie_parts");
        let probe = probe_returning(VideoMetadata::new(0.0, MB));
        let service = SplitService::new(probe, idle_cutter());
        let request = SplitRequest::new(
            dir.path().join("movie.mp4"),
            SplitConfig::ByPartCount { count: 3 },
        )
        .with_output_dir(&out);

        let err = service.run(&request, &|_: &str| {}).await.unwrap_err();

        assert!(
            matches!(err, SplitError::MetadataUnavailable(ref what) if what == "duration")
        );
        assert_eq!(err.to_string(), "Could not determine video duration");
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_missing_size_only_matters_in_size_mode() {
        let probe = probe_returning(VideoMetadata::new(60.0, 0));
        let service = SplitService::new(probe, idle_cutter());
        let request = SplitRequest::new(
            "movie.mp4",
            SplitConfig::ByTargetSize {
                target_size_mb: 10.0,
            },
        );
        let err = service.prepare(&request, &|_: &str| {}).await.unwrap_err();
        assert!(matches!(err, SplitError::MetadataUnavailable(ref what) if what == "size"));

        let probe = probe_returning(VideoMetadata::new(60.0, 0));
        let service = SplitService::new(probe, idle_cutter());
        let request = SplitRequest::new(
            "movie.mp4",
            SplitConfig::ByTargetDuration {
                target_duration_seconds: 20.0,
            },
        );
        let prepared = service.prepare(&request, &|_: &str| {}).await.unwrap();
        assert_eq!(prepared.plan.segment_count, 3);
        assert_eq!(prepared.output_dir, PathBuf::from("movie_parts"));
    }

    #[tokio::test]
    async fn test_invalid_config_never_reaches_the_cutter() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("parts");
        let probe = probe_returning(VideoMetadata::new(600.0, MB));
        let service = SplitService::new(probe, idle_cutter());
        let request = SplitRequest::new("movie.mp4", SplitConfig::ByPartCount { count: 1 })
            .with_output_dir(&out);

        let err = service.run(&request, &|_: &str| {}).await.unwrap_err();

        assert!(matches!(err, SplitError::InvalidParameter(_)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_probe_failure_is_surfaced() {
        let mut probe = MockMediaProbe::new();
        probe
            .expect_probe()
            .returning(|_| Err(SplitError::MetadataUnavailable("duration".to_string())));
        let service = SplitService::new(probe, idle_cutter());
        let request = SplitRequest::new("broken.mp4", SplitConfig::ByPartCount { count: 2 });

        let err = service.run(&request, &|_: &str| {}).await.unwrap_err();
        assert!(matches!(err, SplitError::MetadataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_run_creates_output_dir_and_reports_status() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("movie_parts");

        let mut cutter = MockSegmentCutter::new();
        cutter
            .expect_cut()
            .times(9)
            .returning(|_| Ok(CutOutput::succeeded()));

        let service = SplitService::new(
            probe_returning(VideoMetadata::new(3600.0, 900 * MB)),
            cutter,
        );
        let request = SplitRequest::new(
            dir.path().join("movie.mp4"),
            SplitConfig::ByTargetSize {
                target_size_mb: 100.0,
            },
        )
        .with_output_dir(&out);

        let messages = Mutex::new(Vec::new());
        let sink = |message: &str| messages.lock().unwrap().push(message.to_string());
        let report = service.run(&request, &sink).await.unwrap();

        assert!(out.is_dir());
        assert_eq!(report.output_dir, out);
        assert_eq!(report.parts.len(), 9);
        assert_eq!(report.parts[8], out.join("part_009.mp4"));
        assert!((report.plan.segment_duration_seconds - 400.0).abs() < 1e-6);

        let messages = messages.into_inner().unwrap();
        assert_eq!(messages[0], "Processing... Getting video information");
        assert_eq!(messages[1], "Processing... Analyzing video properties");
        assert_eq!(messages[2], "Processing... Cutting video into 100MB parts");
        assert_eq!(messages[3], "Will create approximately 9 parts of 100MB each");
        assert_eq!(messages[4], "Processing part 1 of 9");
        assert_eq!(messages.last().unwrap(), "Processing part 9 of 9");
    }

    #[tokio::test]
    async fn test_cut_failure_is_the_run_outcome() {
        let dir = tempdir().unwrap();

        let mut cutter = MockSegmentCutter::new();
        let mut seq = mockall::Sequence::new();
        cutter
            .expect_cut()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(CutOutput::succeeded()));
        cutter
            .expect_cut()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(CutOutput::failed("Conversion failed!")));

        let service = SplitService::new(probe_returning(VideoMetadata::new(125.0, MB)), cutter);
        let request = SplitRequest::new(
            dir.path().join("talk.webm"),
            SplitConfig::ByTargetDuration {
                target_duration_seconds: 60.0,
            },
        )
        .with_output_dir(dir.path().join("talk_parts"));

        let err = service.run(&request, &|_: &str| {}).await.unwrap_err();
        assert_eq!(err.failed_part(), Some(2));
    }

    #[test]
    fn test_cutting_messages_per_mode() {
        let by_duration = plan(
            &VideoMetadata::new(600.0, MB),
            &SplitConfig::ByTargetDuration {
                target_duration_seconds: 150.0,
            },
        )
        .unwrap();
        assert_eq!(
            cutting_messages(&by_duration),
            vec![
                "Processing... Cutting video into 2.5min parts",
                "Will create approximately 4 parts of 2.5 minutes each",
            ]
        );

        let by_count = plan(
            &VideoMetadata::new(600.0, MB),
            &SplitConfig::ByPartCount { count: 3 },
        )
        .unwrap();
        assert_eq!(
            cutting_messages(&by_count),
            vec!["Processing... Cutting video into equal parts"]
        );
    }

    #[tokio::test]
    async fn test_duration_mode_announces_parts_before_cutting() {
        let dir = tempdir().unwrap();

        let mut cutter = MockSegmentCutter::new();
        cutter
            .expect_cut()
            .times(2)
            .returning(|_| Ok(CutOutput::succeeded()));

        let service = SplitService::new(probe_returning(VideoMetadata::new(90.0, MB)), cutter);
        let request = SplitRequest::new(
            dir.path().join("talk.mp4"),
            SplitConfig::ByTargetDuration {
                target_duration_seconds: 60.0,
            },
        )
        .with_output_dir(dir.path().join("talk_parts"));

        let messages = Mutex::new(Vec::new());
        let sink = |message: &str| messages.lock().unwrap().push(message.to_string());
        service.run(&request, &sink).await.unwrap();

        let messages = messages.into_inner().unwrap();
        assert_eq!(
            &messages[1..5],
            &[
                "Processing... Analyzing video duration",
                "Processing... Cutting video into 1min parts",
                "Will create approximately 2 parts of 1.0 minutes each",
                "Processing part 1 of 2",
            ]
        );
    }

    #[tokio::test]
    async fn test_spawn_runs_in_background() {
        let dir = tempdir().unwrap();

        let mut cutter = MockSegmentCutter::new();
        cutter
            .expect_cut()
            .times(2)
            .returning(|_| Ok(CutOutput::succeeded()));

        let service = Arc::new(SplitService::new(
            probe_returning(VideoMetadata::new(90.0, MB)),
            cutter,
        ));
        let request = SplitRequest::new(
            dir.path().join("clip"),
            SplitConfig::ByPartCount { count: 2 },
        )
        .with_output_dir(dir.path().join("clip_parts"));

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let handle = service.spawn(request, move |message: &str| {
            let _ = tx.send(message.to_string());
        });

        let report = handle.await.unwrap().unwrap();
        assert_eq!(
            report.parts,
            vec![
                dir.path().join("clip_parts").join("part_001.mp4"),
                dir.path().join("clip_parts").join("part_002.mp4"),
            ]
        );

        let mut received = Vec::new();
        while let Ok(message) = rx.try_recv() {
            received.push(message);
        }
        assert!(received.contains(&"Processing part 2 of 2".to_string()));
    }
}
