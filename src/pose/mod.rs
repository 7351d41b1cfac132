//! Pose vocabulary and geometry
//!
//! - Canonical 17-joint vocabulary
//! - Pose / keyframe / choreography types
//! - Unit-square normalization shared by both generation tiers

pub mod joint;
pub mod keyframe;
pub mod normalize;

pub use joint::Joint;
pub use keyframe::{Choreography, Keyframe, Point, Pose};
pub use normalize::{normalize, normalize_3d};
