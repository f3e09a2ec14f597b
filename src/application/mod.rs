//! Application layer - Services that drive the ports.

pub mod executor;
pub mod splitter;

pub use executor::{RunOutcome, SegmentExecutor};
pub use splitter::{PreparedSplit, SplitReport, SplitRequest, SplitService};
