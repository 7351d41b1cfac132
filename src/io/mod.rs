//! Audio and artifact I/O
//!
//! Audio decoding and container probing using Symphonia, plus JSON
//! persistence of the analysis and choreography artifacts.

pub mod artifacts;
pub mod decoder;

pub use artifacts::{ANALYSIS_FILE_NAME, CHOREOGRAPHY_FILE_NAME};
pub use decoder::{decode_audio, probe_duration, DecodedAudio};
