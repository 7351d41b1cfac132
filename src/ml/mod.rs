//! Pose model generation tier
//!
//! The preferred way to generate choreography is a learned pose model
//! conditioned on the music. Whether such a model can be used is decided once,
//! up front, by [`ModelCapability::probe`]. [`try_generate`] then either
//! produces keyframes or returns `None`, in which case the caller falls back
//! to the template sequencer. Failures of this tier never reach the caller.
//!
//! The ONNX backend is compiled only with the `ml` feature.

pub mod conditioning;
pub mod smpl;

#[cfg(feature = "ml")]
pub mod onnx_model;

use std::fmt;
use std::path::Path;

use crate::analysis::AnalysisResult;
use crate::config::{GenerationConfig, ModelConfig};
use crate::error::ChoreoError;
use crate::features::onset::energy_flux::onset_strength_envelope;
use crate::features::onset::OnsetEnvelope;
use crate::io::decoder::decode_audio;
use crate::pose::Keyframe;
use crate::progress::{ProgressSink, StagedProgress, Stage};

pub use conditioning::{build_music_features, MusicFeatures, MUSIC_FEATURE_DIM};
pub use smpl::{project_frame, smpl_joint, SMPL_JOINT_COUNT};

/// One timestep of raw model output
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoseFrame {
    /// Time in seconds
    pub timestamp: f64,

    /// SMPL joint positions, indexed by SMPL joint number
    pub joints: Vec<[f32; 3]>,
}

/// A pose model that turns music features into skeleton motion
pub trait PoseInference {
    /// Human-readable model identifier for logs
    fn name(&self) -> String;

    /// Acquire whatever the model needs before inference (weights, session)
    fn prepare(&mut self) -> Result<(), ChoreoError> {
        Ok(())
    }

    /// Run the model over a whole track
    fn infer(&mut self, music: &MusicFeatures) -> Result<Vec<RawPoseFrame>, ChoreoError>;
}

/// Whether the pose model tier can run
pub enum ModelCapability {
    /// A model is ready to be used
    Available(Box<dyn PoseInference>),

    /// No model can be used; the reason is kept for logging
    Unavailable(String),
}

impl ModelCapability {
    /// Decide once whether the pose model tier is usable
    ///
    /// Unavailable when no model path is configured, the file does not exist,
    /// the runtime cannot be initialized, or the crate was built without the
    /// `ml` feature.
    pub fn probe(config: &ModelConfig) -> Self {
        let capability = match &config.model_path {
            None => Self::Unavailable("No pose model configured".to_string()),
            Some(path) if !path.is_file() => {
                Self::Unavailable(format!("Pose model not found: {}", path.display()))
            }
            Some(path) => open_backend(path),
        };
        match &capability {
            Self::Available(model) => log::info!("Pose model available: {}", model.name()),
            Self::Unavailable(reason) => log::info!("Pose model unavailable: {}", reason),
        }
        capability
    }

    /// True if a model is ready
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl fmt::Debug for ModelCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(model) => f.debug_tuple("Available").field(&model.name()).finish(),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

#[cfg(feature = "ml")]
fn open_backend(path: &Path) -> ModelCapability {
    match onnx_model::OnnxPoseModel::open(path) {
        Ok(model) => ModelCapability::Available(Box::new(model)),
        Err(e) => ModelCapability::Unavailable(e.to_string()),
    }
}

#[cfg(not(feature = "ml"))]
fn open_backend(path: &Path) -> ModelCapability {
    ModelCapability::Unavailable(format!(
        "Built without the `ml` feature, ignoring {}",
        path.display()
    ))
}

/// Generate keyframes with the pose model
///
/// Milestones (`Loading EDGE model`, `Running EDGE inference`,
/// `Projecting to 2D`) reach `progress` only if generation succeeds.
///
/// # Arguments
///
/// * `capability` - Result of [`ModelCapability::probe`]
/// * `audio_path` - Audio file to condition on
/// * `analysis` - Tempo, duration and beats of the track
/// * `envelope` - Onset envelope from analysis; when absent the audio is
///   decoded again to compute it
/// * `config` - Generation configuration
/// * `progress` - Progress sink
///
/// # Returns
///
/// Time-ordered keyframes, or `None` if the model is unavailable, fails, or
/// produces no usable frame
pub fn try_generate(
    capability: &mut ModelCapability,
    audio_path: &Path,
    analysis: &AnalysisResult,
    envelope: Option<&OnsetEnvelope>,
    config: &GenerationConfig,
    progress: &mut dyn ProgressSink,
) -> Option<Vec<Keyframe>> {
    let model = match capability {
        ModelCapability::Available(model) => model,
        ModelCapability::Unavailable(_) => return None,
    };

    let mut staged = StagedProgress::new();
    match generate_with_model(
        model.as_mut(),
        audio_path,
        analysis,
        envelope,
        config,
        &mut staged,
    ) {
        Ok(frames) => {
            log::info!("Pose model generated {} keyframes", frames.len());
            staged.commit(progress);
            Some(frames)
        }
        Err(e) => {
            log::warn!("Pose model generation failed ({}), falling back", e);
            staged.discard();
            None
        }
    }
}

fn generate_with_model(
    model: &mut dyn PoseInference,
    audio_path: &Path,
    analysis: &AnalysisResult,
    envelope: Option<&OnsetEnvelope>,
    config: &GenerationConfig,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<Keyframe>, ChoreoError> {
    progress.stage(Stage::LoadingModel);
    model.prepare()?;

    let music = match envelope {
        Some(envelope) => build_music_features(
            envelope,
            analysis.bpm,
            &analysis.beat_times,
            analysis.duration,
            config.model.fps,
        )?,
        None => {
            let (envelope, duration) = decode_envelope(audio_path, config)?;
            build_music_features(
                &envelope,
                analysis.bpm,
                &analysis.beat_times,
                duration,
                config.model.fps,
            )?
        }
    };

    progress.stage(Stage::RunningInference);
    let raw = model.infer(&music)?;

    progress.stage(Stage::Projecting);
    let frames = project_frames(raw);
    if frames.is_empty() {
        return Err(ChoreoError::ModelError(
            "Model produced no usable frames".to_string(),
        ));
    }
    Ok(frames)
}

/// Decode `audio_path` and compute its onset envelope and duration
fn decode_envelope(
    audio_path: &Path,
    config: &GenerationConfig,
) -> Result<(OnsetEnvelope, f64), ChoreoError> {
    log::debug!("No analysis envelope, decoding {}", audio_path.display());
    let audio = decode_audio(audio_path)?;
    let envelope = onset_strength_envelope(
        &audio.samples,
        audio.sample_rate,
        config.analysis.frame_size,
        config.analysis.hop_size,
    )?;
    Ok((envelope, audio.duration_seconds()))
}

/// Project raw model output into time-ordered 2D keyframes
///
/// Frames with a negative or non-finite timestamp, and frames with no mapped
/// joint, are dropped. Equal timestamps keep their output order.
pub fn project_frames(raw: Vec<RawPoseFrame>) -> Vec<Keyframe> {
    let mut frames: Vec<Keyframe> = raw
        .into_iter()
        .filter(|frame| frame.timestamp.is_finite() && frame.timestamp >= 0.0)
        .filter_map(|frame| {
            let joints = project_frame(&frame.joints);
            (!joints.is_empty()).then_some(Keyframe {
                timestamp: frame.timestamp,
                joints,
            })
        })
        .collect();
    frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    frames
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pose::Joint;
    use crate::progress::ProgressEvent;
    use std::path::PathBuf;

    /// Model that raises every SMPL joint in turn, one frame per music frame
    pub(crate) struct WavingModel;

    impl PoseInference for WavingModel {
        fn name(&self) -> String {
            "waving".to_string()
        }

        fn infer(&mut self, music: &MusicFeatures) -> Result<Vec<RawPoseFrame>, ChoreoError> {
            Ok((0..music.len())
                .map(|t| RawPoseFrame {
                    timestamp: music.frame_time(t),
                    joints: (0..SMPL_JOINT_COUNT)
                        .map(|j| [j as f32, (j as f32 + t as f32) % 7.0, 0.0])
                        .collect(),
                })
                .collect())
        }
    }

    /// Model whose inference always fails
    pub(crate) struct BrokenModel;

    impl PoseInference for BrokenModel {
        fn name(&self) -> String {
            "broken".to_string()
        }

        fn infer(&mut self, _music: &MusicFeatures) -> Result<Vec<RawPoseFrame>, ChoreoError> {
            Err(ChoreoError::ModelError("out of memory".to_string()))
        }
    }

    pub(crate) fn write_click_wav(path: &Path, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total = (seconds * 22050.0) as usize;
        for i in 0..total {
            let in_click = i % 11025 < 500;
            let sample = if in_click { (i as f32 * 0.3).sin() * 20000.0 } else { 0.0 };
            writer.write_sample(sample as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn analysis(bpm: f64, beat_times: &[f64], duration: f64) -> AnalysisResult {
        AnalysisResult {
            bpm,
            duration,
            beat_times: beat_times.to_vec(),
        }
    }

    fn raw(timestamp: f64, smpl_joints: usize) -> RawPoseFrame {
        RawPoseFrame {
            timestamp,
            joints: (0..smpl_joints)
                .map(|j| [j as f32, (j % 2) as f32, 0.0])
                .collect(),
        }
    }

    #[test]
    fn test_unavailable_without_model_path() {
        let capability = ModelCapability::probe(&ModelConfig::default());
        assert!(!capability.is_available());
    }

    #[test]
    fn test_unavailable_when_model_file_missing() {
        let config = ModelConfig {
            model_path: Some(PathBuf::from("/definitely/not/here.onnx")),
            ..ModelConfig::default()
        };
        match ModelCapability::probe(&config) {
            ModelCapability::Unavailable(reason) => assert!(reason.contains("not found")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_emits_nothing() {
        let mut capability = ModelCapability::Unavailable("none".to_string());
        let mut events: Vec<ProgressEvent> = Vec::new();
        let frames = try_generate(
            &mut capability,
            Path::new("song.wav"),
            &analysis(120.0, &[0.0, 0.5], 1.0),
            None,
            &GenerationConfig::default(),
            &mut events,
        );
        assert!(frames.is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn test_available_model_generates_normalized_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clicks.wav");
        write_click_wav(&path, 2.0);

        let mut capability = ModelCapability::Available(Box::new(WavingModel));
        let mut events: Vec<ProgressEvent> = Vec::new();
        let frames = try_generate(
            &mut capability,
            &path,
            &analysis(120.0, &[0.0, 0.5, 1.0, 1.5], 2.0),
            None,
            &GenerationConfig::default(),
            &mut events,
        )
        .unwrap();

        assert_eq!(frames.len(), 60);
        assert!(frames.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        for frame in &frames {
            assert_eq!(frame.joints.len(), 15);
            assert!(frame.joints.is_unit_normalized());
            assert!(frame.joints.get(Joint::LeftEye).is_none());
        }

        let stages: Vec<&str> = events.iter().map(|e| e.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec!["Loading EDGE model", "Running EDGE inference", "Projecting to 2D"]
        );
    }

    #[test]
    fn test_failed_inference_discards_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clicks.wav");
        write_click_wav(&path, 1.0);

        let mut capability = ModelCapability::Available(Box::new(BrokenModel));
        let mut events: Vec<ProgressEvent> = Vec::new();
        let frames = try_generate(
            &mut capability,
            &path,
            &analysis(120.0, &[0.0, 0.5], 1.0),
            None,
            &GenerationConfig::default(),
            &mut events,
        );
        assert!(frames.is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn test_undecodable_audio_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"garbage").unwrap();

        let mut capability = ModelCapability::Available(Box::new(WavingModel));
        let mut events: Vec<ProgressEvent> = Vec::new();
        let frames = try_generate(
            &mut capability,
            &path,
            &analysis(120.0, &[], 1.0),
            None,
            &GenerationConfig::default(),
            &mut events,
        );
        assert!(frames.is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn test_analysis_envelope_is_reused_without_decoding() {
        let envelope = OnsetEnvelope {
            values: vec![0.0, 1.0, 0.0, 0.5],
            sample_rate: 100,
            hop_size: 25,
        };
        let mut capability = ModelCapability::Available(Box::new(WavingModel));
        let mut events: Vec<ProgressEvent> = Vec::new();
        // The audio file does not exist, so any decode attempt would fail
        let frames = try_generate(
            &mut capability,
            Path::new("/no/such/track.mp3"),
            &analysis(120.0, &[0.0, 0.5], 1.5),
            Some(&envelope),
            &GenerationConfig::default(),
            &mut events,
        )
        .unwrap();

        assert_eq!(frames.len(), 45);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_project_frames_orders_and_filters() {
        let frames = project_frames(vec![
            raw(0.2, 3),
            raw(f64::NAN, 3),
            raw(0.1, 3),
            raw(-0.1, 3),
            raw(0.1, 5),
            RawPoseFrame {
                timestamp: 0.3,
                joints: vec![[1.0, 1.0, 1.0]],
            },
        ]);

        let times: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![0.1, 0.1, 0.2]);
        // Stable: the two frames at 0.1 keep their output order
        assert_eq!(frames[0].joints.len(), 2);
        assert_eq!(frames[1].joints.len(), 3);
        assert!(frames[1].joints.get(Joint::LeftKnee).is_some());
    }
}
