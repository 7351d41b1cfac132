//! Analysis result types

use serde::{Deserialize, Serialize};

use crate::features::onset::OnsetEnvelope;

/// Tempo and beat timeline of a track
///
/// Serialized as the `analysis.json` side artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo in beats per minute
    pub bpm: f64,

    /// Track duration in seconds
    pub duration: f64,

    /// Beat timestamps in seconds, ascending
    pub beat_times: Vec<f64>,
}

impl AnalysisResult {
    /// Result with a uniform beat grid at `bpm` covering `[0, duration)`
    pub fn with_uniform_grid(bpm: f64, duration: f64) -> Self {
        Self {
            bpm,
            duration,
            beat_times: uniform_beat_grid(bpm, duration),
        }
    }
}

/// Outcome of analysing a track
///
/// Analysis never fails outright; when the audio cannot be analysed the
/// result is estimated and tagged as degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Tempo and beats were measured from the decoded audio
    Analyzed {
        /// Measured result
        result: AnalysisResult,
        /// Onset strength envelope the result was measured on
        envelope: OnsetEnvelope,
    },

    /// Analysis failed; tempo and beats are placeholders
    Degraded {
        /// Estimated result
        result: AnalysisResult,
        /// Why the primary analysis failed
        reason: String,
    },
}

impl AnalysisOutcome {
    /// The result, measured or estimated
    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Analyzed { result, .. } => result,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }

    /// Consume the outcome, keeping the result
    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Analyzed { result, .. } => result,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }

    /// Onset envelope of the decoded audio, absent when analysis degraded
    pub fn envelope(&self) -> Option<&OnsetEnvelope> {
        match self {
            AnalysisOutcome::Analyzed { envelope, .. } => Some(envelope),
            AnalysisOutcome::Degraded { .. } => None,
        }
    }

    /// True if the fallback path was taken
    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }
}

/// Uniform beat grid: beat `i` at `i * 60 / bpm` for every time in `[0, duration)`
///
/// Returns an empty grid for a non-positive tempo or duration.
pub fn uniform_beat_grid(bpm: f64, duration: f64) -> Vec<f64> {
    if !(bpm > 0.0) || !(duration > 0.0) || !duration.is_finite() {
        return Vec::new();
    }
    let interval = 60.0 / bpm;
    (0u64..)
        .map(|i| i as f64 * interval)
        .take_while(|&t| t < duration)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_grid_excludes_duration() {
        let grid = uniform_beat_grid(120.0, 180.0);
        assert_eq!(grid.len(), 360);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 0.5);
        assert_eq!(*grid.last().unwrap(), 179.5);
    }

    #[test]
    fn test_uniform_grid_partial_interval() {
        assert_eq!(uniform_beat_grid(120.0, 1.2), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_uniform_grid_degenerate_inputs() {
        assert!(uniform_beat_grid(0.0, 10.0).is_empty());
        assert!(uniform_beat_grid(120.0, 0.0).is_empty());
        assert!(uniform_beat_grid(f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn test_analysis_json_field_names() {
        let result = AnalysisResult::with_uniform_grid(120.0, 1.0);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"bpm":120.0,"duration":1.0,"beat_times":[0.0,0.5]}"#);
    }

    #[test]
    fn test_outcome_accessors() {
        let result = AnalysisResult::with_uniform_grid(120.0, 2.0);
        let outcome = AnalysisOutcome::Degraded {
            result: result.clone(),
            reason: "corrupt".to_string(),
        };
        assert!(outcome.is_degraded());
        assert!(outcome.envelope().is_none());
        assert_eq!(outcome.result(), &result);
        assert_eq!(outcome.into_result(), result);

        let analyzed = AnalysisOutcome::Analyzed {
            result: result.clone(),
            envelope: OnsetEnvelope {
                values: vec![0.0, 1.0],
                sample_rate: 44100,
                hop_size: 512,
            },
        };
        assert!(!analyzed.is_degraded());
        assert_eq!(analyzed.envelope().map(|e| e.len()), Some(2));
    }
}
