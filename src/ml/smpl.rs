//! SMPL skeleton projection
//!
//! The pose model emits the 24-joint SMPL layout. Only the joints with a
//! counterpart in [`Joint`] survive projection; the rest (pelvis, spine,
//! neck, feet, hands, collars) are dropped.

use crate::pose::{normalize_3d, Joint, Pose};

/// Number of joints in the SMPL layout
pub const SMPL_JOINT_COUNT: usize = 24;

/// Joint named by an SMPL index, if the output skeleton has one
pub fn smpl_joint(index: usize) -> Option<Joint> {
    let joint = match index {
        1 => Joint::LeftHip,
        2 => Joint::RightHip,
        4 => Joint::LeftKnee,
        5 => Joint::RightKnee,
        7 => Joint::LeftAnkle,
        8 => Joint::RightAnkle,
        15 => Joint::Nose,
        16 => Joint::LeftEar,
        17 => Joint::RightEar,
        18 => Joint::LeftShoulder,
        19 => Joint::RightShoulder,
        20 => Joint::LeftElbow,
        21 => Joint::RightElbow,
        22 => Joint::LeftWrist,
        23 => Joint::RightWrist,
        _ => return None,
    };
    Some(joint)
}

/// Project one frame of SMPL joints into a normalized 2D pose
///
/// Joint `i` of `joints` is SMPL joint `i`; depth is discarded and the mapped
/// joints are normalized into the unit square. Missing trailing joints are
/// simply absent from the pose.
pub fn project_frame(joints: &[[f32; 3]]) -> Pose {
    normalize_3d(joints.iter().enumerate().filter_map(|(index, &[x, y, z])| {
        smpl_joint(index).map(|joint| (joint, [x as f64, y as f64, z as f64]))
    }))
}
