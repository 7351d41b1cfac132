//! Audio decoding using Symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::ChoreoError;
use crate::preprocessing::channel_mixer::downmix_interleaved;

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples, nominally in [-1.0, 1.0]
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, ChoreoError> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    Ok(probed.format)
}

fn audio_track(format: &dyn FormatReader) -> Result<Track, ChoreoError> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .cloned()
        .ok_or_else(|| ChoreoError::DecodingError("No supported audio tracks found".to_string()))
}

/// Decode an audio file to mono PCM samples
///
/// Every packet of the first supported track is decoded and averaged down to
/// a single channel. Corrupted packets are skipped.
///
/// # Errors
///
/// Returns `ChoreoError` if the file cannot be opened, the container is not
/// recognized, there is no decodable track, or nothing could be decoded.
pub fn decode_audio(path: &Path) -> Result<DecodedAudio, ChoreoError> {
    log::debug!("Decoding audio file: {}", path.display());

    let mut format = open_format(path)?;
    let track = audio_track(format.as_ref())?;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut samples: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                if sample_rate == 0 {
                    sample_rate = spec.rate;
                }

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend(downmix_interleaved(buf.samples(), channels));
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                // Corrupted packet
                log::trace!("Skipping undecodable packet: {}", msg);
                skipped_packets += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if skipped_packets > 0 {
        log::warn!(
            "Skipped {} undecodable packets in {}",
            skipped_packets,
            path.display()
        );
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(ChoreoError::DecodingError(format!(
            "No audio decoded from {}",
            path.display()
        )));
    }

    log::debug!("Decoded {} samples at {} Hz", samples.len(), sample_rate);

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Read the track duration from container metadata without decoding
///
/// This is the lightweight fallback used when full decoding fails.
///
/// # Errors
///
/// Returns `ChoreoError` if the container cannot be probed or does not
/// declare its frame count and sample rate.
pub fn probe_duration(path: &Path) -> Result<f64, ChoreoError> {
    log::debug!("Probing duration of {}", path.display());

    let format = open_format(path)?;
    let track = audio_track(format.as_ref())?;
    let params = &track.codec_params;

    let n_frames = params
        .n_frames
        .ok_or_else(|| ChoreoError::DecodingError("Track does not declare its length".to_string()))?;
    let sample_rate = params
        .sample_rate
        .filter(|&sr| sr > 0)
        .ok_or_else(|| ChoreoError::DecodingError("Track does not declare its sample rate".to_string()))?;

    let duration = n_frames as f64 / sample_rate as f64;
    if !(duration > 0.0) {
        return Err(ChoreoError::DecodingError(format!(
            "Track declares a non-positive duration ({:.3}s)",
            duration
        )));
    }
    Ok(duration)
}
