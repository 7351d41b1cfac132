//! Parametric dance move library
//!
//! Every move is a pure constructor: it takes a phase `t ∈ [0, 1)` (position
//! within the current move) and returns a fresh [`Pose`] over the 13 template
//! joints. Eyes and ears are never placed by templates.

use std::f64::consts::PI;

use crate::pose::{Joint, Pose};

/// Joints placed by every template move
pub const TEMPLATE_JOINTS: [Joint; 13] = [
    Joint::Nose,
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Maximum horizontal sway of a side step
const SIDE_STEP_SHIFT: f64 = 0.06;

/// Horizontal bias of a side step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sway towards +x
    Right,
    /// Sway towards -x
    Left,
}

impl Direction {
    /// Sign applied to the horizontal shift
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Right => 1.0,
            Direction::Left => -1.0,
        }
    }
}

/// A move from the template library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanceMove {
    /// Single up-down arc of both arms
    ArmsUp,
    /// Whole-body sway with arms held wide
    SideStep(Direction),
    /// Arms oscillating out of phase
    WaveArms,
}

impl DanceMove {
    /// Evaluate the move at `phase`
    pub fn pose(&self, phase: f64) -> Pose {
        match self {
            DanceMove::ArmsUp => arms_up(phase),
            DanceMove::SideStep(direction) => side_step(phase, *direction),
            DanceMove::WaveArms => wave_arms(phase),
        }
    }
}

/// Neutral stance shared by all moves
pub fn base_pose() -> Pose {
    Pose::new()
        .with(Joint::Nose, [0.50, 0.08])
        .with(Joint::LeftShoulder, [0.38, 0.22])
        .with(Joint::RightShoulder, [0.62, 0.22])
        .with(Joint::LeftElbow, [0.28, 0.38])
        .with(Joint::RightElbow, [0.72, 0.38])
        .with(Joint::LeftWrist, [0.22, 0.52])
        .with(Joint::RightWrist, [0.78, 0.52])
        .with(Joint::LeftHip, [0.42, 0.52])
        .with(Joint::RightHip, [0.58, 0.52])
        .with(Joint::LeftKnee, [0.40, 0.70])
        .with(Joint::RightKnee, [0.60, 0.70])
        .with(Joint::LeftAnkle, [0.40, 0.88])
        .with(Joint::RightAnkle, [0.60, 0.88])
}

/// Raise elbows and wrists by `|sin(tπ)|`
pub fn arms_up(phase: f64) -> Pose {
    let lift = (phase * PI).sin().abs();
    base_pose()
        .with(Joint::LeftElbow, [0.30, 0.22 - lift * 0.10])
        .with(Joint::RightElbow, [0.70, 0.22 - lift * 0.10])
        .with(Joint::LeftWrist, [0.25, 0.10 - lift * 0.08])
        .with(Joint::RightWrist, [0.75, 0.10 - lift * 0.08])
}

/// Sway the whole body by `direction · 0.06 · |sin(tπ)|`, arms wide
///
/// The arm positions are set after the sway and do not move with it.
pub fn side_step(phase: f64, direction: Direction) -> Pose {
    let shift = direction.sign() * SIDE_STEP_SHIFT * (phase * PI).sin().abs();
    base_pose()
        .map_points(|[x, y]| [x + shift, y])
        .with(Joint::LeftElbow, [0.20, 0.35])
        .with(Joint::RightElbow, [0.80, 0.35])
        .with(Joint::LeftWrist, [0.15, 0.50])
        .with(Joint::RightWrist, [0.85, 0.50])
}

/// Oscillate the arms out of phase with `sin(2πt)`
pub fn wave_arms(phase: f64) -> Pose {
    let wave = (phase * PI * 2.0).sin();
    base_pose()
        .with(Joint::LeftElbow, [0.28 + wave * 0.08, 0.32 + wave * 0.06])
        .with(Joint::LeftWrist, [0.18 + wave * 0.12, 0.20 + wave * 0.10])
        .with(Joint::RightElbow, [0.72 - wave * 0.08, 0.32 - wave * 0.06])
        .with(Joint::RightWrist, [0.82 - wave * 0.12, 0.20 - wave * 0.10])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_point(pose: &Pose, joint: Joint, expected: [f64; 2]) {
        let [x, y] = pose.get(joint).unwrap();
        assert!(
            (x - expected[0]).abs() < EPS && (y - expected[1]).abs() < EPS,
            "{} at ({}, {}), expected {:?}",
            joint,
            x,
            y,
            expected
        );
    }

    #[test]
    fn test_every_move_covers_template_joints() {
        for pose in [
            base_pose(),
            arms_up(0.25),
            side_step(0.5, Direction::Left),
            wave_arms(0.75),
        ] {
            let joints: Vec<Joint> = pose.joints().collect();
            assert_eq!(joints, TEMPLATE_JOINTS.to_vec());
        }
    }

    #[test]
    fn test_arms_up_peaks_mid_move() {
        let start = arms_up(0.0);
        let peak = arms_up(0.5);
        assert_point(&start, Joint::LeftWrist, [0.25, 0.10]);
        assert_point(&peak, Joint::LeftWrist, [0.25, 0.02]);
        assert_point(&peak, Joint::RightElbow, [0.70, 0.12]);
        // Legs untouched
        assert_point(&peak, Joint::LeftAnkle, [0.40, 0.88]);
    }

    #[test]
    fn test_side_step_shifts_body_not_arms() {
        let right = side_step(0.5, Direction::Right);
        let left = side_step(0.5, Direction::Left);
        assert_point(&right, Joint::Nose, [0.56, 0.08]);
        assert_point(&left, Joint::Nose, [0.44, 0.08]);
        assert_point(&right, Joint::LeftWrist, [0.15, 0.50]);
        assert_point(&left, Joint::LeftWrist, [0.15, 0.50]);
    }

    #[test]
    fn test_side_step_at_phase_zero_is_centered() {
        let pose = side_step(0.0, Direction::Left);
        assert_point(&pose, Joint::RightKnee, [0.60, 0.70]);
    }

    #[test]
    fn test_wave_arms_out_of_phase() {
        let pose = wave_arms(0.25);
        assert_point(&pose, Joint::LeftElbow, [0.36, 0.38]);
        assert_point(&pose, Joint::RightElbow, [0.64, 0.26]);
        assert_point(&pose, Joint::LeftWrist, [0.30, 0.30]);
        assert_point(&pose, Joint::RightWrist, [0.70, 0.10]);
    }

    #[test]
    fn test_moves_are_fresh_values() {
        let a = DanceMove::ArmsUp.pose(0.5);
        let _ = DanceMove::SideStep(Direction::Right).pose(0.5);
        assert_eq!(a, arms_up(0.5));
        assert_eq!(base_pose(), base_pose());
    }
}
