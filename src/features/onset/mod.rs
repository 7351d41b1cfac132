//! Onset detection modules
//!
//! Frame-level onset strength used to drive tempo estimation and beat
//! tracking:
//! - Energy flux

pub mod energy_flux;

/// Onset strength per analysis frame
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    /// Onset strength per frame transition (non-negative)
    pub values: Vec<f32>,

    /// Sample rate of the analysed audio in Hz
    pub sample_rate: u32,

    /// Hop size between frames in samples
    pub hop_size: usize,
}

impl OnsetEnvelope {
    /// Number of envelope frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the envelope has no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Envelope frames per second
    pub fn frames_per_second(&self) -> f64 {
        self.sample_rate as f64 / self.hop_size as f64
    }

    /// Time in seconds of envelope frame `index`
    ///
    /// Value `index` is the flux into analysis frame `index + 1`, so it is
    /// placed at the start of that frame.
    pub fn frame_time(&self, index: usize) -> f64 {
        ((index + 1) * self.hop_size) as f64 / self.sample_rate as f64
    }

    /// Largest envelope value (0.0 when empty)
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0f32, f32::max)
    }
}
