//! Music conditioning features for the pose model
//!
//! The model consumes one feature vector per output frame:
//!
//! | index | feature                                                    |
//! |-------|------------------------------------------------------------|
//! | 0     | onset strength maximum inside the frame, scaled to [0, 1]  |
//! | 1     | `1.0` if a beat falls inside the frame, else `0.0`         |
//! | 2     | position within the current beat, in [0, 1)                |

use crate::error::ChoreoError;
use crate::features::onset::OnsetEnvelope;

/// Number of features per model frame
pub const MUSIC_FEATURE_DIM: usize = 3;

/// Per-frame conditioning sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MusicFeatures {
    /// Model frame rate in frames per second
    pub fps: f64,

    /// One feature vector per model frame
    pub frames: Vec<[f32; MUSIC_FEATURE_DIM]>,
}

impl MusicFeatures {
    /// Number of model frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if there are no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Start time in seconds of model frame `index`
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 / self.fps
    }
}

/// Build conditioning features for a track
///
/// # Arguments
///
/// * `envelope` - Onset strength envelope of the track
/// * `bpm` - Track tempo
/// * `beat_times` - Beat timestamps in seconds, ascending
/// * `duration` - Track duration in seconds
/// * `fps` - Model frame rate
///
/// # Returns
///
/// `ceil(duration * fps)` feature vectors
///
/// # Errors
///
/// Returns `ChoreoError::ProcessingError` for a non-positive frame rate, tempo
/// or duration
pub fn build_music_features(
    envelope: &OnsetEnvelope,
    bpm: f64,
    beat_times: &[f64],
    duration: f64,
    fps: f64,
) -> Result<MusicFeatures, ChoreoError> {
    if !(fps > 0.0) || !fps.is_finite() {
        return Err(ChoreoError::ProcessingError(format!(
            "Invalid model frame rate: {}",
            fps
        )));
    }
    if !(bpm > 0.0) || !bpm.is_finite() {
        return Err(ChoreoError::ProcessingError(format!(
            "Invalid tempo for conditioning: {}",
            bpm
        )));
    }
    if !(duration > 0.0) || !duration.is_finite() {
        return Err(ChoreoError::ProcessingError(format!(
            "Invalid duration for conditioning: {}",
            duration
        )));
    }

    let n_frames = (duration * fps).ceil() as usize;
    let frame_of = |time: f64| -> Option<usize> {
        if time < 0.0 || !time.is_finite() {
            return None;
        }
        let index = (time * fps).floor() as usize;
        (index < n_frames).then_some(index)
    };

    let mut strength = vec![0.0f32; n_frames];
    for (i, &value) in envelope.values.iter().enumerate() {
        if let Some(frame) = frame_of(envelope.frame_time(i)) {
            strength[frame] = strength[frame].max(value);
        }
    }
    let peak = envelope.max_value();
    if peak > 0.0 {
        strength.iter_mut().for_each(|v| *v /= peak);
    }

    let mut beat_flags = vec![0.0f32; n_frames];
    for &beat in beat_times {
        if let Some(frame) = frame_of(beat) {
            beat_flags[frame] = 1.0;
        }
    }

    let beats_per_second = bpm / 60.0;
    let mut next_beat = 0;
    let mut previous_beat = 0.0;
    let frames = (0..n_frames)
        .map(|frame| {
            let time = frame as f64 / fps;
            while next_beat < beat_times.len() && beat_times[next_beat] <= time {
                previous_beat = beat_times[next_beat];
                next_beat += 1;
            }
            let phase = ((time - previous_beat) * beats_per_second).fract();
            [strength[frame], beat_flags[frame], phase as f32]
        })
        .collect();

    log::debug!(
        "Built {} conditioning frames at {:.1} fps ({} beats)",
        n_frames,
        fps,
        beat_times.len()
    );

    Ok(MusicFeatures { fps, frames })
}
