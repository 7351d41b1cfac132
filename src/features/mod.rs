//! Feature extraction modules
//!
//! This module contains the beat analysis algorithms:
//! - Onset strength envelope
//! - Period estimation (BPM detection)
//! - Beat tracking (dynamic programming)

pub mod beat_tracking;
pub mod onset;
pub mod period;
