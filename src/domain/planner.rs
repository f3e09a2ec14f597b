//! Segment planning.
//!
//! Every mode reduces to a segment count and a step; [`layout`] then places
//! contiguous segments at `i * step` and leaves the last one open-ended so it
//! always reaches the true end of the stream, whatever rounding happened
//! upstream.
//!
//! The size mode assumes a uniform bitrate across the file. Real part sizes
//! drift from the target with variable bitrate content, and stream-copy cuts
//! snap to keyframes, so the target is an approximation, not a bound.

use super::split::{Segment, SegmentationPlan, SplitConfig, VideoMetadata};
use crate::error::{SplitError, SplitResult};
use tracing::debug;

/// Counts past this cannot be laid out; only reachable with degenerate ratios.
const MAX_SEGMENTS: f64 = u32::MAX as f64;

/// Relative distance under which a ratio is treated as the nearest integer.
const RATIO_EPSILON: f64 = 1e-9;

/// Plan for `metadata` according to `config`.
pub fn plan(metadata: &VideoMetadata, config: &SplitConfig) -> SplitResult<SegmentationPlan> {
    match *config {
        SplitConfig::ByPartCount { count } => plan_by_part_count(metadata.duration_seconds, count),
        SplitConfig::ByTargetSize { target_size_mb } => plan_by_target_size(
            metadata.duration_seconds,
            metadata.size_bytes,
            target_size_mb,
        ),
        SplitConfig::ByTargetDuration {
            target_duration_seconds,
        } => plan_by_target_duration(metadata.duration_seconds, target_duration_seconds),
    }
}

/// `count` equal parts.
pub fn plan_by_part_count(total_duration: f64, count: usize) -> SplitResult<SegmentationPlan> {
    require_positive("video duration", total_duration)?;
    if count < 2 {
        return Err(SplitError::InvalidParameter(format!(
            "number of parts must be at least 2, got {}",
            count
        )));
    }

    let segment_duration = total_duration / count as f64;
    layout(
        SplitConfig::ByPartCount { count },
        count,
        segment_duration,
        None,
    )
}

/// Parts of roughly `target_size_mb` megabytes each, assuming the average
/// bitrate holds across the whole file.
pub fn plan_by_target_size(
    total_duration: f64,
    total_size_bytes: u64,
    target_size_mb: f64,
) -> SplitResult<SegmentationPlan> {
    require_positive("video duration", total_duration)?;
    require_positive("target size", target_size_mb)?;
    if total_size_bytes == 0 {
        return Err(SplitError::InvalidParameter(
            "video size must be greater than 0".to_string(),
        ));
    }

    let metadata = VideoMetadata::new(total_duration, total_size_bytes);
    let bitrate = (total_size_bytes as f64 * 8.0) / total_duration;
    let count = segments_needed(metadata.size_mb(), target_size_mb)?;
    let segment_duration = total_duration / count as f64;

    debug!(
        bitrate_bps = bitrate,
        count,
        segment_duration,
        "Estimated size-based layout"
    );

    layout(
        SplitConfig::ByTargetSize { target_size_mb },
        count,
        segment_duration,
        Some(bitrate),
    )
}

/// Parts of `target_duration_seconds` each; the last one takes the remainder.
pub fn plan_by_target_duration(
    total_duration: f64,
    target_duration_seconds: f64,
) -> SplitResult<SegmentationPlan> {
    require_positive("video duration", total_duration)?;
    require_positive("target duration", target_duration_seconds)?;

    let count = segments_needed(total_duration, target_duration_seconds)?;
    layout(
        SplitConfig::ByTargetDuration {
            target_duration_seconds,
        },
        count,
        target_duration_seconds,
        None,
    )
}

fn layout(
    config: SplitConfig,
    count: usize,
    step: f64,
    estimated_bitrate_bps: Option<f64>,
) -> SplitResult<SegmentationPlan> {
    if count == 0 {
        return Err(SplitError::InvalidParameter(
            "plan would contain no segments".to_string(),
        ));
    }

    let last = count - 1;
    let segments = (0..count)
        .map(|index| Segment {
            index,
            start_offset_seconds: index as f64 * step,
            length_seconds: if index == last { None } else { Some(step) },
        })
        .collect();

    Ok(SegmentationPlan {
        config,
        segment_count: count,
        segment_duration_seconds: step,
        estimated_bitrate_bps,
        segments,
    })
}

/// `max(1, ceil(total / target))`, ignoring float noise around integers.
fn segments_needed(total: f64, target: f64) -> SplitResult<usize> {
    let ratio = total / target;
    let nearest = ratio.round();
    let ratio = if (ratio - nearest).abs() <= RATIO_EPSILON * nearest.max(1.0) {
        nearest
    } else {
        ratio
    };

    let count = ratio.ceil().max(1.0);
    if !count.is_finite() || count > MAX_SEGMENTS {
        return Err(SplitError::InvalidParameter(format!(
            "plan would contain {} parts",
            count
        )));
    }
    Ok(count as usize)
}

fn require_positive(name: &str, value: f64) -> SplitResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SplitError::InvalidParameter(format!(
            "{} must be greater than 0, got {}",
            name, value
        )))
    }
}
