//! Beat tracking modules
//!
//! Generate a beat sequence from a tempo estimate:
//! - Dynamic programming tracker

pub mod dynamic;

pub use dynamic::DynamicBeatTracker;

/// Tracked beat
#[derive(Debug, Clone)]
pub struct BeatPosition {
    /// Onset envelope frame index
    pub frame: usize,

    /// Time in seconds
    pub time_seconds: f64,
}
