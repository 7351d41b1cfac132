//! Error types for the choreography generator

use std::fmt;

/// Errors that can occur while generating a choreography
///
/// Only input errors and fatal run errors ever leave the pipeline. Analysis
/// and inference failures are absorbed by their adapters and turned into a
/// fallback decision, so the variants below that describe them are only seen
/// inside those adapters.
#[derive(Debug)]
pub enum ChoreoError {
    /// Invalid input parameters (missing audio file, bad arguments)
    InvalidInput(String),

    /// Audio decoding or container probing error
    DecodingError(String),

    /// Processing error during analysis or generation
    ProcessingError(String),

    /// Pose inference model could not be loaded or run
    ModelError(String),

    /// Invalid configuration
    Config(String),

    /// Filesystem error while reading or writing artifacts
    Io(std::io::Error),

    /// JSON (de)serialization error
    Serialization(serde_json::Error),
}

impl fmt::Display for ChoreoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoreoError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ChoreoError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            ChoreoError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            ChoreoError::ModelError(msg) => write!(f, "Model error: {}", msg),
            ChoreoError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ChoreoError::Io(err) => write!(f, "I/O error: {}", err),
            ChoreoError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for ChoreoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChoreoError::Io(err) => Some(err),
            ChoreoError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChoreoError {
    fn from(err: std::io::Error) -> Self {
        ChoreoError::Io(err)
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(err: serde_json::Error) -> Self {
        ChoreoError::Serialization(err)
    }
}

impl From<symphonia::core::errors::Error> for ChoreoError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        ChoreoError::DecodingError(err.to_string())
    }
}
