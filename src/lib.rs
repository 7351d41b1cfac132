//! # Stratum Choreo
//!
//! Beat-synchronized choreography generation: turns an audio track into a
//! sequence of timestamped 2D poses in a canonical 17-joint vocabulary.
//!
//! ## Features
//!
//! - **Beat Analysis**: Onset envelope, autocorrelation tempo estimate and
//!   dynamic-programming beat tracking, with a degraded fallback for
//!   undecodable audio
//! - **Pose Model Tier**: Optional ONNX pose model conditioned on the music
//!   (`ml` feature)
//! - **Template Tier**: Deterministic move library sequenced on the beat grid
//! - **Progress Stream**: JSON lines describing each pipeline milestone
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_choreo::{GenerationConfig, JsonLinesSink, Pipeline};
//! use std::path::Path;
//!
//! let mut pipeline = Pipeline::new(GenerationConfig::default());
//! let mut progress = JsonLinesSink::stdout();
//! let choreography = pipeline.run(
//!     Path::new("song.mp3"),
//!     Path::new("out/song"),
//!     &mut progress,
//! )?;
//!
//! println!("{} keyframes at {:.1} BPM", choreography.frames.len(), choreography.bpm);
//! # Ok::<(), stratum_choreo::ChoreoError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio Input → Analysis → Pose Model (or Template Sequencer) → Normalization → Output
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod choreography;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod ml;
pub mod pipeline;
pub mod pose;
pub mod preprocessing;
pub mod progress;

// Re-export main types
pub use analysis::{AnalysisOutcome, AnalysisResult};
pub use config::{AnalysisConfig, GenerationConfig, ModelConfig};
pub use error::ChoreoError;
pub use ml::ModelCapability;
pub use pipeline::Pipeline;
pub use pose::{Choreography, Joint, Keyframe, Pose};
pub use progress::{JsonLinesSink, ProgressEvent, ProgressSink, Stage};
