//! Ports - Traits the core drives, implemented by adapters.

pub mod cutter;
pub mod probe;
pub mod progress;

pub use cutter::{CutOutput, CutRequest, SegmentCutter};
pub use probe::MediaProbe;
pub use progress::ProgressSink;
