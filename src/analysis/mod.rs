//! Track analysis
//!
//! Combines decoding and beat features into the tempo / beat timeline
//! consumed by both generation tiers:
//! - Result types
//! - File analyzer with degraded fallback

pub mod analyzer;
pub mod result;

pub use analyzer::{analyze_file, analyze_samples};
pub use result::{uniform_beat_grid, AnalysisOutcome, AnalysisResult};
