//! Track analysis with degraded fallback
//!
//! The primary path decodes the audio and measures tempo and beats. When the
//! file cannot be decoded the analyzer falls back to container metadata for
//! the duration (or a fixed placeholder) and a uniform beat grid at the
//! fallback tempo. Either way a usable [`AnalysisResult`] comes back.

use std::path::Path;
use std::time::Instant;

use super::result::{uniform_beat_grid, AnalysisOutcome, AnalysisResult};
use crate::config::AnalysisConfig;
use crate::error::ChoreoError;
use crate::features::beat_tracking::DynamicBeatTracker;
use crate::features::onset::energy_flux::onset_strength_envelope;
use crate::features::onset::OnsetEnvelope;
use crate::features::period::{estimate_tempo, TempoPrior};
use crate::io::decoder::{decode_audio, probe_duration};
use crate::progress::{ProgressSink, Stage};

/// Analyze an audio file
///
/// Emits `Analyzing music` before starting and `Analyzing music (fallback)`
/// if the primary analysis fails.
///
/// # Arguments
///
/// * `path` - Audio file
/// * `config` - Analysis parameters, including the fallback tempo and duration
/// * `progress` - Progress sink
///
/// # Returns
///
/// `AnalysisOutcome::Analyzed` on success, `AnalysisOutcome::Degraded` with
/// an estimated result otherwise. Never fails.
pub fn analyze_file(
    path: &Path,
    config: &AnalysisConfig,
    progress: &mut dyn ProgressSink,
) -> AnalysisOutcome {
    progress.stage(Stage::AnalyzingMusic);
    log::info!("Analyzing {}", path.display());

    let primary = decode_audio(path)
        .and_then(|audio| analyze_decoded(&audio.samples, audio.sample_rate, config));

    match primary {
        Ok((result, envelope)) => AnalysisOutcome::Analyzed { result, envelope },
        Err(e) => {
            log::warn!("Analysis of {} failed, using fallback: {}", path.display(), e);
            progress.stage(Stage::AnalyzingMusicFallback);
            AnalysisOutcome::Degraded {
                result: fallback_result(path, config),
                reason: e.to_string(),
            }
        }
    }
}

/// Estimate a result without decoding
fn fallback_result(path: &Path, config: &AnalysisConfig) -> AnalysisResult {
    let duration = match probe_duration(path) {
        Ok(duration) => duration,
        Err(e) => {
            log::warn!(
                "Duration probe failed ({}), assuming {:.1}s",
                e,
                config.fallback_duration
            );
            config.fallback_duration
        }
    };
    AnalysisResult::with_uniform_grid(config.fallback_bpm, duration)
}

/// Analyze decoded mono samples
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis parameters
///
/// # Returns
///
/// Tempo, duration and beats. If no beat can be tracked (silence, very short
/// clip) the beats form a uniform grid; if no tempo can be estimated either,
/// the grid uses the fallback tempo.
///
/// # Errors
///
/// Returns `ChoreoError` for empty input, a zero sample rate, or invalid
/// analysis parameters
pub fn analyze_samples(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, ChoreoError> {
    analyze_decoded(samples, sample_rate, config).map(|(result, _)| result)
}

/// Analyze decoded samples, keeping the onset envelope for later stages
fn analyze_decoded(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<(AnalysisResult, OnsetEnvelope), ChoreoError> {
    let start_time = Instant::now();

    if samples.is_empty() {
        return Err(ChoreoError::InvalidInput("Empty audio samples".to_string()));
    }

    if sample_rate == 0 {
        return Err(ChoreoError::InvalidInput("Invalid sample rate".to_string()));
    }

    let duration = samples.len() as f64 / sample_rate as f64;
    log::debug!(
        "Starting beat analysis: {} samples at {} Hz ({:.2}s)",
        samples.len(),
        sample_rate,
        duration
    );

    let envelope =
        onset_strength_envelope(samples, sample_rate, config.frame_size, config.hop_size)?;

    let prior = TempoPrior {
        center_bpm: config.prior_bpm,
        width_octaves: config.prior_octaves,
    };
    let tempo = estimate_tempo(&envelope, config.min_bpm, config.max_bpm, prior)?;

    let (bpm, mut beat_times) = match tempo {
        Some(bpm) => {
            let beats = DynamicBeatTracker::new(bpm, config.tightness)
                .track_beats(&envelope)?;
            let times: Vec<f64> = beats
                .into_iter()
                .map(|b| b.time_seconds)
                .filter(|&t| t < duration)
                .collect();
            (bpm as f64, times)
        }
        None => {
            log::debug!(
                "No tempo found, using fallback {:.1} BPM",
                config.fallback_bpm
            );
            (config.fallback_bpm, Vec::new())
        }
    };

    if beat_times.is_empty() {
        log::info!("No beats detected, synthesizing a uniform grid at {:.2} BPM", bpm);
        beat_times = uniform_beat_grid(bpm, duration);
    }

    log::debug!(
        "Beat analysis finished in {:.2} ms: {:.2} BPM, {} beats",
        start_time.elapsed().as_secs_f64() * 1000.0,
        bpm,
        beat_times.len()
    );

    let result = AnalysisResult {
        bpm,
        duration,
        beat_times,
    };
    Ok((result, envelope))
}
