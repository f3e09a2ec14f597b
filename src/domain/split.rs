use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Duration and size of a source video, as reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_seconds: f64,
    pub size_bytes: u64,
}

impl VideoMetadata {
    pub fn new(duration_seconds: f64, size_bytes: u64) -> Self {
        Self {
            duration_seconds,
            size_bytes,
        }
    }

    /// Size in megabytes (1 MB = 1024 * 1024 bytes).
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

/// How a video should be split. One mode per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitConfig {
    /// N equal parts, N >= 2
    ByPartCount { count: usize },
    /// Parts of roughly this many megabytes
    ByTargetSize { target_size_mb: f64 },
    /// Parts of this many seconds, the last one shorter
    ByTargetDuration { target_duration_seconds: f64 },
}

impl SplitConfig {
    /// Whether planning needs the file size as well as the duration.
    pub fn needs_size(&self) -> bool {
        matches!(self, SplitConfig::ByTargetSize { .. })
    }
}

/// One contiguous slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 0-based position in the plan
    pub index: usize,
    pub start_offset_seconds: f64,
    /// `None` means "until the end of the stream"
    pub length_seconds: Option<f64>,
}

impl Segment {
    /// 1-based number used for progress messages and file names.
    pub fn part_number(&self) -> usize {
        self.index + 1
    }

    pub fn is_open_ended(&self) -> bool {
        self.length_seconds.is_none()
    }

    /// End offset, or `None` for the open-ended final segment.
    pub fn end_offset_seconds(&self) -> Option<f64> {
        self.length_seconds
            .map(|length| self.start_offset_seconds + length)
    }
}

/// Ordered segments computed for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationPlan {
    pub config: SplitConfig,
    pub segment_count: usize,
    /// Nominal length of every segment but the last
    pub segment_duration_seconds: f64,
    /// Average bitrate the size mode derived the layout from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_bitrate_bps: Option<f64>,
    pub segments: Vec<Segment>,
}

impl SegmentationPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}
