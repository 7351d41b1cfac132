//! Dynamic programming beat tracker
//!
//! Places beats on the onset strength envelope given a global tempo estimate.
//!
//! # Algorithm
//!
//! For every frame `t` the tracker keeps the best cumulative score of a beat
//! sequence ending at `t`:
//!
//! ```text
//! C[t] = O[t] + max over τ in [t - 2P, t - P/2] of ( C[τ] - α · ln((t - τ) / P)² )
//! ```
//!
//! where `O` is the smoothed, normalized onset strength, `P` the beat period in
//! frames and `α` the tightness. The final beat is the last strong local
//! maximum of `C`; earlier beats follow the stored back-links. Weak beats at
//! either end (leading or trailing silence) are trimmed.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use super::BeatPosition;
use crate::error::ChoreoError;
use crate::features::onset::OnsetEnvelope;

/// Numerical stability epsilon
const EPSILON: f64 = 1e-10;

/// Dynamic programming beat tracker
#[derive(Debug, Clone)]
pub struct DynamicBeatTracker {
    /// Global tempo estimate in BPM
    pub bpm: f32,

    /// Penalty weight for deviating from the beat period
    pub tightness: f32,
}

impl DynamicBeatTracker {
    /// Create a new tracker
    pub fn new(bpm: f32, tightness: f32) -> Self {
        Self { bpm, tightness }
    }

    /// Track beats on an onset strength envelope
    ///
    /// # Returns
    ///
    /// Beat positions in time order. Empty when the envelope is flat or
    /// shorter than one beat period.
    ///
    /// # Errors
    ///
    /// Returns `ChoreoError::InvalidInput` for a non-positive tempo or tightness
    pub fn track_beats(&self, envelope: &OnsetEnvelope) -> Result<Vec<BeatPosition>, ChoreoError> {
        if !(self.bpm > 0.0) || !self.bpm.is_finite() {
            return Err(ChoreoError::InvalidInput(format!(
                "Invalid tempo for beat tracking: {}",
                self.bpm
            )));
        }
        if !(self.tightness > 0.0) {
            return Err(ChoreoError::InvalidInput(format!(
                "Invalid beat tracker tightness: {}",
                self.tightness
            )));
        }

        let period = 60.0 * envelope.frames_per_second() / self.bpm as f64;
        log::debug!(
            "Tracking beats: {} frames, BPM={:.2}, period={:.2} frames",
            envelope.len(),
            self.bpm,
            period
        );

        if period < 1.0 || (envelope.len() as f64) < period {
            log::debug!("Envelope shorter than one beat period, no beats");
            return Ok(Vec::new());
        }

        let local = match local_score(&envelope.values, period) {
            Some(local) => local,
            None => {
                log::debug!("Flat onset envelope, no beats");
                return Ok(Vec::new());
            }
        };

        let (cumulative, backlinks) = self.accumulate(&local, period);
        let last = last_beat(&cumulative);

        let mut frames = vec![last];
        let mut current = last;
        while let Some(previous) = backlinks[current] {
            frames.push(previous);
            current = previous;
        }
        frames.reverse();

        let frames = trim_weak_beats(frames, &local);

        let beats: Vec<BeatPosition> = frames
            .into_iter()
            .map(|frame| BeatPosition {
                frame,
                time_seconds: envelope.frame_time(frame),
            })
            .collect();

        log::debug!("Tracked {} beats", beats.len());
        Ok(beats)
    }

    fn accumulate(&self, local: &[f64], period: f64) -> (Vec<f64>, Vec<Option<usize>>) {
        let n = local.len();
        let max_gap = (2.0 * period).round() as usize;
        let min_gap = ((period / 2.0).round() as usize).max(1);
        let tightness = self.tightness as f64;

        let mut cumulative = vec![0.0f64; n];
        let mut backlinks: Vec<Option<usize>> = vec![None; n];

        for t in 0..n {
            let mut best: Option<(usize, f64)> = None;
            if t >= min_gap {
                let lo = t.saturating_sub(max_gap);
                let hi = t - min_gap;
                for tau in lo..=hi {
                    let deviation = ((t - tau) as f64 / period).ln();
                    let score = cumulative[tau] - tightness * deviation * deviation;
                    if best.map_or(true, |(_, b)| score > b) {
                        best = Some((tau, score));
                    }
                }
            }

            match best {
                Some((tau, score)) if score > 0.0 => {
                    cumulative[t] = local[t] + score;
                    backlinks[t] = Some(tau);
                }
                _ => cumulative[t] = local[t],
            }
        }

        (cumulative, backlinks)
    }
}

/// Normalize by standard deviation and smooth with a Gaussian of width P/32
fn local_score(values: &[f32], period: f64) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    if std <= EPSILON {
        return None;
    }

    let half = period.round() as usize;
    let kernel: Vec<f64> = (0..=2 * half)
        .map(|k| {
            let offset = (k as f64 - half as f64) * 32.0 / period;
            (-0.5 * offset * offset).exp()
        })
        .collect();

    let len = values.len();
    let smoothed = (0..len)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, &w)| {
                    let j = (i + k).checked_sub(half)?;
                    values.get(j).map(|&v| w * v as f64 / std)
                })
                .sum()
        })
        .collect();
    Some(smoothed)
}

/// Last local maximum of the cumulative score above half the median maximum
fn last_beat(cumulative: &[f64]) -> usize {
    let n = cumulative.len();
    let maxima: Vec<usize> = (1..n.saturating_sub(1))
        .filter(|&i| cumulative[i] > cumulative[i - 1] && cumulative[i] >= cumulative[i + 1])
        .collect();

    if maxima.is_empty() {
        return cumulative
            .iter()
            .enumerate()
            .fold(0, |best, (i, &v)| if v > cumulative[best] { i } else { best });
    }

    let mut values: Vec<f64> = maxima.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = values[values.len() / 2];
    let threshold = 0.5 * median;

    maxima
        .iter()
        .rev()
        .copied()
        .find(|&i| cumulative[i] >= threshold)
        .unwrap_or(maxima[maxima.len() - 1])
}

/// Drop leading and trailing beats weaker than half the beat RMS strength
fn trim_weak_beats(frames: Vec<usize>, local: &[f64]) -> Vec<usize> {
    if frames.is_empty() {
        return frames;
    }
    let rms = (frames.iter().map(|&f| local[f] * local[f]).sum::<f64>() / frames.len() as f64)
        .sqrt();
    let threshold = 0.5 * rms;

    let start = frames.iter().position(|&f| local[f] >= threshold);
    let end = frames.iter().rposition(|&f| local[f] >= threshold);
    match (start, end) {
        (Some(start), Some(end)) => frames[start..=end].to_vec(),
        _ => Vec::new(),
    }
}
