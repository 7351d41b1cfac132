//! Bounding-box normalization into the unit square
//!
//! Maps raw joint positions (any scale, any origin) into `[0, 1]²` with the
//! vertical axis flipped:
//!
//! ```text
//! x' = (x - min_x) / range_x
//! y' = 1 - (y - min_y) / range_y
//! ```
//!
//! A zero extent on either axis is replaced by `1.0`, so a single-point pose
//! collapses onto the corner `(0, 1)` instead of dividing by zero.

use super::joint::Joint;
use super::keyframe::Pose;

/// Normalize 2D joint positions into the unit square
///
/// # Arguments
///
/// * `points` - Raw `(joint, [x, y])` positions; non-finite points are skipped
///
/// # Returns
///
/// Normalized pose over the same joints. Empty input gives an empty pose.
///
/// # Example
///
/// ```
/// use stratum_choreo::pose::{normalize, Joint};
///
/// let pose = normalize([(Joint::Nose, [2.0, 0.0]), (Joint::LeftAnkle, [0.0, 4.0])]);
/// assert_eq!(pose.get(Joint::Nose), Some([1.0, 1.0]));
/// assert_eq!(pose.get(Joint::LeftAnkle), Some([0.0, 0.0]));
/// ```
pub fn normalize<I>(points: I) -> Pose
where
    I: IntoIterator<Item = (Joint, [f64; 2])>,
{
    let visible: Vec<(Joint, [f64; 2])> = points
        .into_iter()
        .filter(|(_, [x, y])| x.is_finite() && y.is_finite())
        .collect();

    if visible.is_empty() {
        return Pose::new();
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for (_, [x, y]) in &visible {
        min_x = min_x.min(*x);
        max_x = max_x.max(*x);
        min_y = min_y.min(*y);
        max_y = max_y.max(*y);
    }

    let range_x = non_zero_extent(max_x - min_x);
    let range_y = non_zero_extent(max_y - min_y);

    visible
        .into_iter()
        .map(|(joint, [x, y])| {
            (
                joint,
                [(x - min_x) / range_x, 1.0 - (y - min_y) / range_y],
            )
        })
        .collect()
}

/// Normalize 3D joint positions, ignoring depth
pub fn normalize_3d<I>(points: I) -> Pose
where
    I: IntoIterator<Item = (Joint, [f64; 3])>,
{
    normalize(points.into_iter().map(|(joint, [x, y, _])| (joint, [x, y])))
}

fn non_zero_extent(extent: f64) -> f64 {
    if extent == 0.0 {
        1.0
    } else {
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Vec<(Joint, [f64; 2])> {
        vec![
            (Joint::Nose, [0.1, -1.7]),
            (Joint::LeftShoulder, [-0.2, -1.4]),
            (Joint::RightShoulder, [0.3, -1.4]),
            (Joint::LeftWrist, [-0.6, -0.9]),
            (Joint::RightAnkle, [0.2, 0.0]),
        ]
    }

    #[test]
    fn test_empty_input_gives_empty_pose() {
        let pose = normalize(Vec::new());
        assert!(pose.is_empty());
        assert!(normalize_3d(Vec::new()).is_empty());
    }

    #[test]
    fn test_output_in_unit_square() {
        let pose = normalize(skeleton());
        assert_eq!(pose.len(), 5);
        assert!(pose.is_unit_normalized());
    }

    #[test]
    fn test_extremes_map_to_edges() {
        let pose = normalize(skeleton());
        // Minimum raw x -> 0
        assert_eq!(pose.get(Joint::LeftWrist).unwrap()[0], 0.0);
        // Maximum raw x -> 1
        assert_eq!(pose.get(Joint::RightShoulder).unwrap()[0], 1.0);
        // Minimum raw y -> 1 after the flip, maximum raw y -> 0
        assert_eq!(pose.get(Joint::Nose).unwrap()[1], 1.0);
        assert_eq!(pose.get(Joint::RightAnkle).unwrap()[1], 0.0);
    }

    #[test]
    fn test_single_point_collapses_to_corner() {
        let pose = normalize([(Joint::LeftKnee, [3.5, -2.0])]);
        assert_eq!(pose.get(Joint::LeftKnee), Some([0.0, 1.0]));
    }

    #[test]
    fn test_repeated_point_collapses_to_corner() {
        let pose = normalize([(Joint::LeftKnee, [1.0, 1.0]), (Joint::RightKnee, [1.0, 1.0])]);
        assert_eq!(pose.get(Joint::LeftKnee), Some([0.0, 1.0]));
        assert_eq!(pose.get(Joint::RightKnee), Some([0.0, 1.0]));
    }

    #[test]
    fn test_flat_axis_uses_unit_extent() {
        // All points share y; x still spans [0, 1]
        let pose = normalize([(Joint::LeftHip, [0.0, 5.0]), (Joint::RightHip, [2.0, 5.0])]);
        assert_eq!(pose.get(Joint::LeftHip), Some([0.0, 1.0]));
        assert_eq!(pose.get(Joint::RightHip), Some([1.0, 1.0]));
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let pose = normalize([
            (Joint::Nose, [f64::NAN, 0.0]),
            (Joint::LeftHip, [0.0, 0.0]),
            (Joint::RightHip, [1.0, 1.0]),
        ]);
        assert_eq!(pose.get(Joint::Nose), None);
        assert_eq!(pose.len(), 2);
    }

    #[test]
    fn test_3d_ignores_depth() {
        let flat = normalize(skeleton());
        let deep = normalize_3d(
            skeleton()
                .into_iter()
                .enumerate()
                .map(|(i, (j, [x, y]))| (j, [x, y, i as f64 * 10.0])),
        );
        assert_eq!(flat, deep);
    }
}
