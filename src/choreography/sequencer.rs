//! Beat-synchronized template sequencer
//!
//! Lays the move library out against the beat timeline. Moves follow the
//! fixed cycle `[ArmsUp, SideStep, WaveArms, SideStep]`, each lasting
//! [`BEATS_PER_MOVE`] beats. For beat index `i`:
//!
//! ```text
//! move      = MOVE_CYCLE[(i / 4) % 4]
//! phase     = (i % 4) / 4
//! direction = Right if (i / 4) is even, else Left   (side steps only)
//! ```
//!
//! Beats later than the track duration end the sequence; they are dropped,
//! not clamped.

use super::moves::{DanceMove, Direction};
use crate::pose::Keyframe;

/// Number of beats each move spans
pub const BEATS_PER_MOVE: usize = 4;

/// Kind of move at each position of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    ArmsUp,
    SideStep,
    WaveArms,
}

const MOVE_CYCLE: [MoveKind; 4] = [
    MoveKind::ArmsUp,
    MoveKind::SideStep,
    MoveKind::WaveArms,
    MoveKind::SideStep,
];

/// Move and phase scheduled on a beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSlot {
    /// Move to perform
    pub dance_move: DanceMove,

    /// Position within the move, in `[0, 1)`
    pub phase: f64,
}

/// Move scheduled on beat `beat_index`
pub fn slot_for_beat(beat_index: usize) -> BeatSlot {
    let move_number = beat_index / BEATS_PER_MOVE;
    let direction = if move_number % 2 == 0 {
        Direction::Right
    } else {
        Direction::Left
    };
    let dance_move = match MOVE_CYCLE[move_number % MOVE_CYCLE.len()] {
        MoveKind::ArmsUp => DanceMove::ArmsUp,
        MoveKind::SideStep => DanceMove::SideStep(direction),
        MoveKind::WaveArms => DanceMove::WaveArms,
    };
    let phase = (beat_index % BEATS_PER_MOVE) as f64 / BEATS_PER_MOVE as f64;

    BeatSlot { dance_move, phase }
}

/// Generate template keyframes, one per beat
///
/// # Arguments
///
/// * `bpm` - Track tempo (informational; the beat list already encodes timing)
/// * `beat_times` - Beat timestamps in seconds, ascending
/// * `duration` - Track duration in seconds
///
/// # Returns
///
/// One keyframe per beat up to the first beat after `duration`.
/// Deterministic for identical inputs.
pub fn generate(bpm: f64, beat_times: &[f64], duration: f64) -> Vec<Keyframe> {
    log::debug!(
        "Sequencing template moves: {} beats at {:.2} BPM over {:.2}s",
        beat_times.len(),
        bpm,
        duration
    );

    let frames: Vec<Keyframe> = beat_times
        .iter()
        .take_while(|&&t| t <= duration)
        .enumerate()
        .map(|(i, &timestamp)| {
            let slot = slot_for_beat(i);
            Keyframe {
                timestamp,
                joints: slot.dance_move.pose(slot.phase),
            }
        })
        .collect();

    if frames.len() < beat_times.len() {
        log::debug!(
            "Dropped {} beats past the end of the track",
            beat_times.len() - frames.len()
        );
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::moves::{arms_up, side_step, wave_arms};

    #[test]
    fn test_truncates_at_duration() {
        let frames = generate(120.0, &[0.0, 0.5, 1.0, 1.5, 2.0], 1.2);
        let times: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_beat_on_duration_is_kept() {
        let frames = generate(120.0, &[0.0, 0.5, 1.0], 1.0);
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_stops_at_first_late_beat() {
        // Out-of-order input: everything after the first late beat is dropped
        let frames = generate(120.0, &[0.0, 5.0, 1.0], 2.0);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_move_cycle_and_direction() {
        let expected = [
            (DanceMove::ArmsUp, 0.0),
            (DanceMove::ArmsUp, 0.25),
            (DanceMove::ArmsUp, 0.5),
            (DanceMove::ArmsUp, 0.75),
            (DanceMove::SideStep(Direction::Left), 0.0),
            (DanceMove::SideStep(Direction::Left), 0.25),
        ];
        for (i, (dance_move, phase)) in expected.iter().enumerate() {
            let slot = slot_for_beat(i);
            assert_eq!(slot.dance_move, *dance_move, "beat {}", i);
            assert_eq!(slot.phase, *phase, "beat {}", i);
        }
        assert_eq!(slot_for_beat(8).dance_move, DanceMove::WaveArms);
        assert_eq!(
            slot_for_beat(12).dance_move,
            DanceMove::SideStep(Direction::Left)
        );
        // Side steps sit on odd move numbers of the cycle, so they keep leaning left
        assert_eq!(slot_for_beat(16).dance_move, DanceMove::ArmsUp);
        assert_eq!(
            slot_for_beat(20).dance_move,
            DanceMove::SideStep(Direction::Left)
        );
        assert_eq!(
            slot_for_beat(28).dance_move,
            DanceMove::SideStep(Direction::Left)
        );
    }

    #[test]
    fn test_frames_use_scheduled_moves() {
        let beats: Vec<f64> = (0..16).map(|i| i as f64 * 0.5).collect();
        let frames = generate(120.0, &beats, 60.0);
        assert_eq!(frames.len(), 16);
        assert_eq!(frames[1].joints, arms_up(0.25));
        assert_eq!(frames[6].joints, side_step(0.5, Direction::Left));
        assert_eq!(frames[11].joints, wave_arms(0.75));
        assert_eq!(frames[13].joints, side_step(0.25, Direction::Left));
    }

    #[test]
    fn test_deterministic_output() {
        let beats: Vec<f64> = (0..40).map(|i| i as f64 * 0.47).collect();
        let a = serde_json::to_vec(&generate(127.6, &beats, 15.0)).unwrap();
        let b = serde_json::to_vec(&generate(127.6, &beats, 15.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_beats() {
        assert!(generate(120.0, &[], 10.0).is_empty());
    }
}
