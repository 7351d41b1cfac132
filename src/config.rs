//! Configuration parameters for choreography generation

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ChoreoError;

/// Environment variable consulted for the model path when none is configured
pub const MODEL_PATH_ENV: &str = "STRATUM_CHOREO_MODEL";

/// Audio analysis configuration parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Onset envelope
    /// Frame size for RMS energy frames (default: 2048)
    pub frame_size: usize,

    /// Hop size between frames (default: 512)
    pub hop_size: usize,

    // Tempo estimation
    /// Minimum BPM to consider (default: 60.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 200.0)
    pub max_bpm: f32,

    /// Centre of the log-tempo prior in BPM (default: 120.0)
    pub prior_bpm: f32,

    /// Width of the log-tempo prior in octaves (default: 1.0)
    pub prior_octaves: f32,

    // Beat tracking
    /// Penalty weight for deviating from the estimated beat period (default: 100.0)
    ///
    /// Larger values force a more rigid grid.
    pub tightness: f32,

    // Fallbacks
    /// Tempo assumed when analysis fails or no tempo is found (default: 120.0)
    ///
    /// This is a compatibility placeholder, not a musically principled default.
    pub fallback_bpm: f64,

    /// Duration assumed when neither decoding nor probing succeeds (default: 180.0 s)
    ///
    /// Arbitrary, kept for compatibility with existing consumers.
    pub fallback_duration: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            min_bpm: 60.0,
            max_bpm: 200.0,
            prior_bpm: 120.0,
            prior_octaves: 1.0,
            tightness: 100.0,
            fallback_bpm: 120.0,
            fallback_duration: 180.0,
        }
    }
}

/// Pose inference model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX pose model (requires the `ml` feature)
    pub model_path: Option<PathBuf>,

    /// Output frame rate of the model in frames per second (default: 30.0)
    pub fps: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            fps: 30.0,
        }
    }
}

/// Complete generation configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Audio analysis parameters
    pub analysis: AnalysisConfig,

    /// Pose model parameters
    pub model: ModelConfig,
}

impl GenerationConfig {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields keep their defaults, so a file may override a single value.
    pub fn from_json_file(path: &Path) -> Result<Self, ChoreoError> {
        log::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config: GenerationConfig = serde_json::from_str(&text)
            .map_err(|e| ChoreoError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Fill in the model path from [`MODEL_PATH_ENV`] if none is set
    pub fn with_env_overrides(mut self) -> Self {
        if self.model.model_path.is_none() {
            if let Some(path) = std::env::var_os(MODEL_PATH_ENV) {
                if !path.is_empty() {
                    self.model.model_path = Some(PathBuf::from(path));
                }
            }
        }
        self
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), ChoreoError> {
        let a = &self.analysis;
        if a.frame_size == 0 || a.hop_size == 0 {
            return Err(ChoreoError::Config(
                "frame_size and hop_size must be > 0".to_string(),
            ));
        }
        if a.hop_size > a.frame_size {
            return Err(ChoreoError::Config(format!(
                "hop_size ({}) must not exceed frame_size ({})",
                a.hop_size, a.frame_size
            )));
        }
        if a.min_bpm <= 0.0 || a.min_bpm >= a.max_bpm {
            return Err(ChoreoError::Config(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                a.min_bpm, a.max_bpm
            )));
        }
        if a.prior_bpm <= 0.0 || a.prior_octaves <= 0.0 {
            return Err(ChoreoError::Config(
                "Tempo prior must have positive centre and width".to_string(),
            ));
        }
        if !(a.fallback_bpm > 0.0) || !(a.fallback_duration > 0.0) {
            return Err(ChoreoError::Config(
                "Fallback bpm and duration must be > 0".to_string(),
            ));
        }
        if !(self.model.fps > 0.0) {
            return Err(ChoreoError::Config("Model fps must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.fallback_bpm, 120.0);
        assert_eq!(config.analysis.fallback_duration, 180.0);
        assert!(config.model.model_path.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "analysis": { "hop_size": 256 }, "model": { "model_path": "edge.onnx" } }"#;
        let config: GenerationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.analysis.hop_size, 256);
        assert_eq!(config.analysis.frame_size, 2048);
        assert_eq!(config.model.model_path, Some(PathBuf::from("edge.onnx")));
        assert_eq!(config.model.fps, 30.0);
    }

    #[test]
    fn test_invalid_bpm_range_rejected() {
        let mut config = GenerationConfig::default();
        config.analysis.min_bpm = 200.0;
        config.analysis.max_bpm = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hop_larger_than_frame_rejected() {
        let mut config = GenerationConfig::default();
        config.analysis.hop_size = 4096;
        assert!(config.validate().is_err());
    }
}
