//! Generation pipeline
//!
//! One run turns an audio file into two artifacts in an output directory:
//!
//! ```text
//! audio ─► analysis ─► analysis.json
//!              │
//!              ▼
//!         pose model ──(None)──► template sequencer
//!              │                        │
//!              └──────────┬─────────────┘
//!                         ▼
//!                    choreo.json
//! ```
//!
//! Analysis and pose-model failures are absorbed by their fallbacks. Only a
//! missing input file or a fatal error (filesystem, serialization) ends the
//! run, and it is reported once as the terminal `Error` progress event.

use std::path::Path;
use std::time::Instant;

use crate::analysis::analyze_file;
use crate::choreography;
use crate::config::GenerationConfig;
use crate::error::ChoreoError;
use crate::io::artifacts::{write_analysis, write_choreography};
use crate::ml::{try_generate, ModelCapability};
use crate::pose::Choreography;
use crate::progress::{ProgressEvent, ProgressSink, Stage};

/// Audio-to-choreography pipeline
///
/// Holds the configuration and the pose model capability, probed once when
/// the pipeline is built. A pipeline may run any number of tracks.
#[derive(Debug)]
pub struct Pipeline {
    config: GenerationConfig,
    capability: ModelCapability,
}

impl Pipeline {
    /// Build a pipeline, probing for the configured pose model
    pub fn new(config: GenerationConfig) -> Self {
        let capability = ModelCapability::probe(&config.model);
        Self::with_capability(config, capability)
    }

    /// Build a pipeline with an explicit pose model capability
    pub fn with_capability(config: GenerationConfig, capability: ModelCapability) -> Self {
        Self { config, capability }
    }

    /// Active configuration
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Pose model capability
    pub fn capability(&self) -> &ModelCapability {
        &self.capability
    }

    /// Generate a choreography for one track
    ///
    /// Writes `analysis.json` and `choreo.json` into `output_dir`, creating it
    /// if needed, and reports milestones to `progress`.
    ///
    /// # Arguments
    ///
    /// * `audio_path` - Audio file (MP3, WAV, ...)
    /// * `output_dir` - Artifact directory; its last component names the song
    /// * `progress` - Progress sink
    ///
    /// # Returns
    ///
    /// The choreography that was written
    ///
    /// # Errors
    ///
    /// Returns `ChoreoError::InvalidInput` if the audio file does not exist, or
    /// `ChoreoError::Io` / `ChoreoError::Serialization` if an artifact cannot
    /// be written. The error is also emitted as the terminal `Error` event.
    /// Files written before the failure are left in place.
    pub fn run(
        &mut self,
        audio_path: &Path,
        output_dir: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<Choreography, ChoreoError> {
        let start_time = Instant::now();
        match self.execute(audio_path, output_dir, progress) {
            Ok(choreography) => {
                log::info!(
                    "Generated {} keyframes for '{}' in {:.2}s",
                    choreography.frames.len(),
                    choreography.song_id,
                    start_time.elapsed().as_secs_f64()
                );
                Ok(choreography)
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                progress.emit(ProgressEvent::error(e.to_string()));
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        audio_path: &Path,
        output_dir: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<Choreography, ChoreoError> {
        if !audio_path.is_file() {
            return Err(ChoreoError::InvalidInput(format!(
                "File not found: {}",
                audio_path.display()
            )));
        }

        std::fs::create_dir_all(output_dir)?;

        let outcome = analyze_file(audio_path, &self.config.analysis, progress);
        let analysis = outcome.result();
        write_analysis(output_dir, analysis)?;

        progress.stage(Stage::GeneratingMoves);
        let frames = match try_generate(
            &mut self.capability,
            audio_path,
            analysis,
            outcome.envelope(),
            &self.config,
            progress,
        ) {
            Some(frames) => frames,
            None => {
                progress.stage(Stage::GeneratingTemplateMoves);
                choreography::generate(analysis.bpm, &analysis.beat_times, analysis.duration)
            }
        };

        progress.stage(Stage::SavingChoreography);
        let choreography = Choreography {
            song_id: song_id(output_dir),
            bpm: analysis.bpm,
            total_duration: analysis.duration,
            frames,
        };
        write_choreography(output_dir, &choreography)?;
        progress.stage(Stage::Done);

        Ok(choreography)
    }
}

/// Song identifier for an output directory: its last path component
///
/// Falls back to the whole path when there is no final component (`/`, `..`).
pub fn song_id(output_dir: &Path) -> String {
    match output_dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => output_dir.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::uniform_beat_grid;
    use crate::io::artifacts::{read_analysis, read_choreography};
    use crate::ml::tests::{write_click_wav, WavingModel};
    use crate::progress::ProgressEvent;

    fn stages(events: &[ProgressEvent]) -> Vec<&str> {
        events.iter().map(|e| e.stage.as_str()).collect()
    }

    #[test]
    fn test_song_id_from_output_dir() {
        assert_eq!(song_id(Path::new("/data/out/abc123")), "abc123");
        assert_eq!(song_id(Path::new("relative/track-7")), "track-7");
        assert_eq!(song_id(Path::new("/")), "/");
    }

    #[test]
    fn test_missing_input_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let mut pipeline = Pipeline::new(GenerationConfig::default());
        let mut events: Vec<ProgressEvent> = Vec::new();

        let result = pipeline.run(&dir.path().join("missing.mp3"), &output, &mut events);

        assert!(matches!(result, Err(ChoreoError::InvalidInput(_))));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
        assert_eq!(events[0].progress, 0.0);
        assert!(!output.exists());
    }

    #[test]
    fn test_corrupt_audio_uses_template_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("broken.mp3");
        std::fs::write(&audio, b"definitely not an mp3").unwrap();
        let output = dir.path().join("song42");

        let mut pipeline = Pipeline::new(GenerationConfig::default());
        let mut events: Vec<ProgressEvent> = Vec::new();
        let choreography = pipeline.run(&audio, &output, &mut events).unwrap();

        assert_eq!(
            stages(&events),
            vec![
                "Analyzing music",
                "Analyzing music (fallback)",
                "Generating moves",
                "Generating moves (template mode)",
                "Saving choreography",
                "Done",
            ]
        );

        assert_eq!(choreography.song_id, "song42");
        assert_eq!(choreography.bpm, 120.0);
        assert_eq!(choreography.total_duration, 180.0);
        let grid = uniform_beat_grid(120.0, 180.0);
        assert_eq!(choreography.frames, choreography::generate(120.0, &grid, 180.0));

        let analysis = read_analysis(&output.join("analysis.json")).unwrap();
        assert_eq!(analysis.beat_times, grid);
        assert_eq!(read_choreography(&output.join("choreo.json")).unwrap(), choreography);
    }

    #[test]
    fn test_pose_model_path() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clicks.wav");
        write_click_wav(&audio, 3.0);
        let output = dir.path().join("nested").join("clicks");

        let mut pipeline = Pipeline::with_capability(
            GenerationConfig::default(),
            ModelCapability::Available(Box::new(WavingModel)),
        );
        let mut events: Vec<ProgressEvent> = Vec::new();
        let choreography = pipeline.run(&audio, &output, &mut events).unwrap();

        assert_eq!(
            stages(&events),
            vec![
                "Analyzing music",
                "Generating moves",
                "Loading EDGE model",
                "Running EDGE inference",
                "Projecting to 2D",
                "Saving choreography",
                "Done",
            ]
        );
        assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(choreography.frames.len(), 90);
        assert!(choreography.is_time_ordered());
        assert!(choreography.frames.iter().all(|f| f.joints.is_unit_normalized()));
    }
}
