//! ONNX pose model backend
//!
//! Model contract:
//! - input `"music"`: `f32[1, T, 3]` conditioning features
//! - output `"joints"`: `f32[T, 24, 3]` SMPL joint positions (a leading batch
//!   axis of size 1 is accepted)
//!
//! Output timestep `t` is placed at `t / fps` seconds.

use ndarray::Array3;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};

use super::conditioning::{MusicFeatures, MUSIC_FEATURE_DIM};
use super::{PoseInference, RawPoseFrame};
use crate::error::ChoreoError;

const INPUT_NAME: &str = "music";
const OUTPUT_NAME: &str = "joints";

fn model_error(e: impl std::fmt::Display) -> ChoreoError {
    ChoreoError::ModelError(e.to_string())
}

/// ONNX Runtime pose model
///
/// The session is created lazily by [`PoseInference::prepare`], so probing
/// for the model stays cheap.
pub struct OnnxPoseModel {
    path: PathBuf,
    session: Option<Session>,
}

impl OnnxPoseModel {
    /// Check that the runtime is usable and the model file exists
    ///
    /// # Errors
    ///
    /// Returns `ChoreoError::ModelError` if ONNX Runtime cannot be initialized
    /// or the model file is missing
    pub fn open(path: &Path) -> Result<Self, ChoreoError> {
        if !path.is_file() {
            return Err(ChoreoError::ModelError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }
        // Fails when the runtime library cannot be loaded
        Session::builder().map_err(model_error)?;
        Ok(Self {
            path: path.to_path_buf(),
            session: None,
        })
    }

    fn load(path: &Path) -> Result<Session, ChoreoError> {
        log::debug!("Loading ONNX model from: {}", path.display());
        let builder = Session::builder().map_err(model_error)?;
        let builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_error)?;
        builder.commit_from_file(path).map_err(model_error)
    }
}

impl std::fmt::Debug for OnnxPoseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPoseModel")
            .field("path", &self.path)
            .field("loaded", &self.session.is_some())
            .finish()
    }
}

impl PoseInference for OnnxPoseModel {
    fn name(&self) -> String {
        format!("onnx:{}", self.path.display())
    }

    fn prepare(&mut self) -> Result<(), ChoreoError> {
        if self.session.is_none() {
            self.session = Some(Self::load(&self.path)?);
        }
        Ok(())
    }

    fn infer(&mut self, music: &MusicFeatures) -> Result<Vec<RawPoseFrame>, ChoreoError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ChoreoError::ModelError("Model session not loaded".to_string()))?;

        let steps = music.len();
        let input = Array3::from_shape_vec(
            (1, steps, MUSIC_FEATURE_DIM),
            music.frames.iter().flatten().copied().collect(),
        )
        .map_err(model_error)?;
        let input_tensor = Tensor::from_array(input).map_err(model_error)?;

        log::debug!("Running ONNX inference on {} frames", steps);
        let outputs = session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .map_err(model_error)?;
        let joints: ndarray::ArrayViewD<f32> = outputs[OUTPUT_NAME]
            .try_extract_array()
            .map_err(model_error)?;

        let shape = joints.shape().to_vec();
        let joints = match shape.as_slice() {
            [_, _, 3] => joints,
            [1, _, _, 3] => joints.index_axis_move(ndarray::Axis(0), 0),
            _ => {
                return Err(ChoreoError::ModelError(format!(
                    "Unexpected '{}' output shape {:?}",
                    OUTPUT_NAME, shape
                )))
            }
        };

        let (timesteps, n_joints) = (joints.shape()[0], joints.shape()[1]);
        let frames = (0..timesteps)
            .map(|t| RawPoseFrame {
                timestamp: music.frame_time(t),
                joints: (0..n_joints)
                    .map(|j| [joints[[t, j, 0]], joints[[t, j, 1]], joints[[t, j, 2]]])
                    .collect(),
            })
            .collect();
        Ok(frames)
    }
}
