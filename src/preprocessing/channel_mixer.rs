//! Channel mixing utilities (multichannel to mono conversion)

/// Convert interleaved multichannel samples to mono by averaging channels
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`[L0, R0, L1, R1, ...]` for stereo)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// Mono samples, one per frame. A trailing partial frame is dropped.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    log::trace!(
        "Downmixing {} samples from {} channels",
        interleaved.len(),
        channels
    );

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
