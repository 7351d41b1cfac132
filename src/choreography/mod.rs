//! Procedural choreography (template tier)
//!
//! Deterministic fallback used whenever the pose model is unavailable:
//! - Parametric move library
//! - Beat-phase sequencer

pub mod moves;
pub mod sequencer;

pub use moves::{DanceMove, Direction};
pub use sequencer::{generate, slot_for_beat, BeatSlot, BEATS_PER_MOVE};
