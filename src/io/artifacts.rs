//! JSON artifact persistence
//!
//! Each run writes two files into its output directory:
//! - `analysis.json`: tempo, duration and beat timeline
//! - `choreo.json`: the final choreography

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisResult;
use crate::error::ChoreoError;
use crate::pose::Choreography;

/// File name of the analysis side artifact
pub const ANALYSIS_FILE_NAME: &str = "analysis.json";

/// File name of the choreography artifact
pub const CHOREOGRAPHY_FILE_NAME: &str = "choreo.json";

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ChoreoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ChoreoError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write `analysis.json` into `output_dir`
pub fn write_analysis(output_dir: &Path, analysis: &AnalysisResult) -> Result<PathBuf, ChoreoError> {
    let path = output_dir.join(ANALYSIS_FILE_NAME);
    write_json(&path, analysis)?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Write `choreo.json` into `output_dir`
pub fn write_choreography(
    output_dir: &Path,
    choreography: &Choreography,
) -> Result<PathBuf, ChoreoError> {
    let path = output_dir.join(CHOREOGRAPHY_FILE_NAME);
    write_json(&path, choreography)?;
    log::debug!(
        "Wrote {} ({} frames)",
        path.display(),
        choreography.frames.len()
    );
    Ok(path)
}

/// Read an analysis artifact
pub fn read_analysis(path: &Path) -> Result<AnalysisResult, ChoreoError> {
    read_json(path)
}

/// Read a choreography artifact
pub fn read_choreography(path: &Path) -> Result<Choreography, ChoreoError> {
    read_json(path)
}
