//! Autocorrelation-based tempo estimation
//!
//! Finds periodicity in the onset strength envelope using FFT-accelerated
//! autocorrelation.
//!
//! # Algorithm
//!
//! 1. Remove the envelope mean
//! 2. Compute autocorrelation using FFT acceleration: `ACF = IFFT(|FFT(signal)|²)`
//! 3. Weight every lag in the BPM range by a log-tempo prior
//! 4. Pick the best lag and refine it with parabolic interpolation
//! 5. Convert lag to BPM: `BPM = 60 * frames_per_second / lag`
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60. (log-Gaussian tempo prior)

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::ChoreoError;
use crate::features::onset::OnsetEnvelope;

const EPSILON: f32 = 1e-10;

/// Log-tempo prior parameters
#[derive(Debug, Clone, Copy)]
pub struct TempoPrior {
    /// Most likely tempo in BPM
    pub center_bpm: f32,

    /// Standard deviation in octaves
    pub width_octaves: f32,
}

impl TempoPrior {
    /// Prior weight of `bpm`, 1.0 at the centre
    pub fn weight(&self, bpm: f32) -> f32 {
        let octaves = (bpm / self.center_bpm).log2() / self.width_octaves;
        (-0.5 * octaves * octaves).exp()
    }
}

impl Default for TempoPrior {
    fn default() -> Self {
        Self {
            center_bpm: 120.0,
            width_octaves: 1.0,
        }
    }
}

/// Estimate tempo from an onset strength envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength envelope
/// * `min_bpm` - Minimum BPM to consider
/// * `max_bpm` - Maximum BPM to consider
/// * `prior` - Log-tempo prior used to resolve octave ambiguity
///
/// # Returns
///
/// `Some(bpm)` for a periodic envelope, `None` when the envelope is
/// flat (silence) or too short to contain one beat period.
///
/// # Errors
///
/// Returns `ChoreoError::InvalidInput` for an invalid BPM range
pub fn estimate_tempo(
    envelope: &OnsetEnvelope,
    min_bpm: f32,
    max_bpm: f32,
    prior: TempoPrior,
) -> Result<Option<f32>, ChoreoError> {
    if min_bpm <= 0.0 || max_bpm <= 0.0 || min_bpm >= max_bpm {
        return Err(ChoreoError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            min_bpm, max_bpm
        )));
    }

    log::debug!(
        "Estimating tempo from {} envelope frames, range=[{:.1}, {:.1}] BPM",
        envelope.len(),
        min_bpm,
        max_bpm
    );

    if envelope.max_value() <= EPSILON {
        log::debug!("Flat onset envelope, no tempo");
        return Ok(None);
    }

    let fps = envelope.frames_per_second() as f32;

    // lag = (60 * fps) / BPM
    let lag_min = ((60.0 * fps) / max_bpm).ceil().max(1.0) as usize;
    let lag_max = ((60.0 * fps) / min_bpm).floor() as usize;

    if lag_min >= lag_max || lag_max + 1 >= envelope.len() {
        log::warn!(
            "Envelope too short for tempo estimation: {} frames, lag range [{}, {}]",
            envelope.len(),
            lag_min,
            lag_max
        );
        return Ok(None);
    }

    let mean = envelope.values.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.values.iter().map(|&v| v - mean).collect();
    let acf = compute_autocorrelation_fft(&centered);

    if acf[0] <= EPSILON {
        return Ok(None);
    }

    let lag_to_bpm = |lag: f32| 60.0 * fps / lag;

    let mut best: Option<(usize, f32)> = None;
    for lag in lag_min..=lag_max {
        let weighted = acf[lag] * prior.weight(lag_to_bpm(lag as f32));
        if weighted > EPSILON && best.map_or(true, |(_, b)| weighted > b) {
            best = Some((lag, weighted));
        }
    }

    let Some((best_lag, _)) = best else {
        log::debug!("No positive autocorrelation in lag range");
        return Ok(None);
    };

    let refined_lag = refine_peak(&acf, best_lag);
    let bpm = lag_to_bpm(refined_lag).clamp(min_bpm, max_bpm);

    log::debug!(
        "Tempo estimate: {:.2} BPM (lag {:.2} frames)",
        bpm,
        refined_lag
    );

    Ok(Some(bpm))
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²)
///
/// # Arguments
///
/// * `signal` - Input signal
///
/// # Returns
///
/// Autocorrelation function (same length as input), unnormalized
fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    // FFT size: next power of 2 >= 2*n (zero-padding avoids circular wrap)
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    // |FFT|²
    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / (fft_size as f32);
    buffer[..n].iter().map(|x| x.re * scale).collect()
}

/// Parabolic interpolation of a peak position
fn refine_peak(values: &[f32], index: usize) -> f32 {
    if index == 0 || index + 1 >= values.len() {
        return index as f32;
    }
    let (left, center, right) = (values[index - 1], values[index], values[index + 1]);
    let denominator = left - 2.0 * center + right;
    if denominator.abs() <= EPSILON {
        return index as f32;
    }
    let offset = 0.5 * (left - right) / denominator;
    index as f32 + offset.clamp(-0.5, 0.5)
}
