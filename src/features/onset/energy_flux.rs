//! Energy flux onset strength envelope
//!
//! Measures how sharply the signal gets louder from one frame to the next.
//!
//! Algorithm:
//! 1. Divide audio into overlapping frames (frame_size, hop_size)
//! 2. Compute RMS energy per frame
//! 3. Compute energy derivative (flux): E_flux[n] = max(0, E[n] - E[n-1])
//!
//! Unlike a peak-picked onset list, the envelope keeps every frame's strength,
//! which is what the tempo estimator and the beat tracker consume.
//!
//! # Example
//!
//! ```no_run
//! use stratum_choreo::features::onset::energy_flux::onset_strength_envelope;
//!
//! let samples = vec![0.0f32; 44100 * 30]; // 30 seconds of audio
//! let envelope = onset_strength_envelope(&samples, 44100, 2048, 512)?;
//! println!("{} frames at {:.1} fps", envelope.len(), envelope.frames_per_second());
//! # Ok::<(), stratum_choreo::ChoreoError>(())
//! ```

use super::OnsetEnvelope;
use crate::error::ChoreoError;

/// Compute the onset strength envelope using energy flux
///
/// # Reference
///
/// Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
/// A Tutorial on Onset Detection in Music Signals.
/// *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.
///
/// # Arguments
///
/// * `samples` - Audio samples (mono, normalized to [-1.0, 1.0])
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - Frame size for analysis (typically 2048)
/// * `hop_size` - Hop size between frames (typically 512)
///
/// # Returns
///
/// Envelope with one value per frame transition. Audio shorter than two
/// frames yields an empty envelope.
///
/// # Errors
///
/// Returns `ChoreoError::InvalidInput` if any parameter is zero
pub fn onset_strength_envelope(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
) -> Result<OnsetEnvelope, ChoreoError> {
    if frame_size == 0 {
        return Err(ChoreoError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(ChoreoError::InvalidInput("Hop size must be > 0".to_string()));
    }

    if sample_rate == 0 {
        return Err(ChoreoError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    let empty = OnsetEnvelope {
        values: Vec::new(),
        sample_rate,
        hop_size,
    };

    if samples.len() < frame_size {
        log::warn!(
            "Frame size ({}) larger than audio length ({}), returning empty envelope",
            frame_size,
            samples.len()
        );
        return Ok(empty);
    }

    let num_frames = (samples.len() - frame_size) / hop_size + 1;
    if num_frames < 2 {
        // Need at least 2 frames to compute flux
        return Ok(empty);
    }

    log::debug!(
        "Computing energy flux envelope: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        num_frames
    );

    // RMS: sqrt(mean(squared samples))
    let frame_energies: Vec<f32> = (0..num_frames)
        .map(|i| {
            let start = i * hop_size;
            let frame = &samples[start..start + frame_size];
            let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
            (sum_sq / frame_size as f32).sqrt()
        })
        .collect();

    let values: Vec<f32> = frame_energies
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();

    Ok(OnsetEnvelope {
        values,
        sample_rate,
        hop_size,
    })
}
