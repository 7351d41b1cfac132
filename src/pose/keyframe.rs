//! Pose, keyframe and choreography types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::joint::Joint;

/// Normalized 2D point `[x, y]`
pub type Point = [f64; 2];

/// Mapping from a subset of joints to normalized points
///
/// Iterates (and serializes) in joint declaration order. An empty pose means
/// "no detection".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(BTreeMap<Joint, Point>);

impl Pose {
    /// Empty pose
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Return a copy of this pose with `joint` placed at `point`
    pub fn with(mut self, joint: Joint, point: Point) -> Self {
        self.0.insert(joint, point);
        self
    }

    /// Return a copy of this pose with `f` applied to every point
    pub fn map_points(self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.into_iter().map(|(j, p)| (j, f(p))).collect())
    }

    /// Position of a joint, if present
    pub fn get(&self, joint: Joint) -> Option<Point> {
        self.0.get(&joint).copied()
    }

    /// Number of joints present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no joint is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over present joints in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Joint, Point)> + '_ {
        self.0.iter().map(|(j, p)| (*j, *p))
    }

    /// Joints present in this pose
    pub fn joints(&self) -> impl Iterator<Item = Joint> + '_ {
        self.0.keys().copied()
    }

    /// True if every coordinate lies in `[0, 1]`
    pub fn is_unit_normalized(&self) -> bool {
        self.0
            .values()
            .all(|p| p.iter().all(|v| (0.0..=1.0).contains(v)))
    }
}

impl FromIterator<(Joint, Point)> for Pose {
    fn from_iter<I: IntoIterator<Item = (Joint, Point)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A pose at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds from the start of the track
    pub timestamp: f64,

    /// Joint positions
    pub joints: Pose,
}

/// Complete choreography for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choreography {
    /// Identifier of the source track (the output directory name)
    #[serde(rename = "songMD5")]
    pub song_id: String,

    /// Tempo in beats per minute
    pub bpm: f64,

    /// Track duration in seconds
    #[serde(rename = "totalDuration")]
    pub total_duration: f64,

    /// Keyframes sorted by timestamp
    pub frames: Vec<Keyframe>,
}

impl Choreography {
    /// True if timestamps never decrease
    pub fn is_time_ordered(&self) -> bool {
        self.frames
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
