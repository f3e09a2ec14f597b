//! cutitnow - Split a video into parts with ffmpeg stream copy
//!
//! Hexagonal Architecture:
//! - domain/: Pure planning logic (split modes, segment layout, naming, timecodes)
//! - ports/: Trait definitions (probe, cutter, progress sink)
//! - adapters/: Concrete implementations (ffmpeg / ffprobe)
//! - application/: Segment executor and the split service
//! - config: Environment configuration
//!
//! A run probes the source once, plans contiguous segments (the last one
//! always runs to the end of the stream), then cuts them strictly one after
//! the other. The first failed cut ends the run; parts already written are
//! left in place.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::{RunOutcome, SegmentExecutor, SplitReport, SplitRequest, SplitService};
pub use config::SplitterConfig;
pub use domain::{Segment, SegmentationPlan, SplitConfig, VideoMetadata};
pub use error::{SplitError, SplitResult};
