//! Domain layer - Pure splitting logic, no I/O.

pub mod layout;
pub mod planner;
pub mod split;
pub mod timecode;

pub use planner::{plan, plan_by_part_count, plan_by_target_duration, plan_by_target_size};
pub use split::{Segment, SegmentationPlan, SplitConfig, VideoMetadata};
