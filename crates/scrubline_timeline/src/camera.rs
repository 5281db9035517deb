// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera poses recorded by the camera sequence.

use crate::easing::lerp;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Per-component tolerance used when comparing poses
pub const POSE_EPSILON: f64 = 1e-5;

/// Projection mode of a viewport camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraProjection {
    /// Orthographic
    Parallel,
    /// Perspective with vertical lines kept vertical
    TwoPointPerspective,
    /// Regular perspective
    #[default]
    Perspective,
}

/// Position and lens of a viewport camera
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraPose {
    /// Camera location
    pub location: DVec3,
    /// Point the camera looks at
    pub target: DVec3,
    /// Up direction
    pub up: DVec3,
    /// 35mm-equivalent lens length
    #[serde(rename = "lens")]
    pub lens_length: f64,
    /// Projection mode
    pub projection: CameraProjection,
}

impl CameraPose {
    /// Create a pose from its components
    pub fn new(
        location: DVec3,
        target: DVec3,
        up: DVec3,
        lens_length: f64,
        projection: CameraProjection,
    ) -> Self {
        Self {
            location,
            target,
            up,
            lens_length,
            projection,
        }
    }

    /// Create a pose whose up direction is derived from a roll angle
    pub fn from_roll(
        location: DVec3,
        target: DVec3,
        roll: f64,
        lens_length: f64,
        projection: CameraProjection,
    ) -> Self {
        Self::new(
            location,
            target,
            up_from_roll(location, target, roll),
            lens_length,
            projection,
        )
    }

    /// Normalized view direction, zero when location and target coincide
    pub fn forward(&self) -> DVec3 {
        (self.target - self.location).normalize_or_zero()
    }

    /// Roll angle of the up direction around the view direction.
    ///
    /// Zero means the camera's up vector points as close to world +Z as the
    /// view direction allows.
    pub fn roll(&self) -> f64 {
        let forward = self.forward();
        let reference = view_reference(forward);
        let up = (self.up - forward * self.up.dot(forward)).normalize_or_zero();
        forward.dot(reference.cross(up)).atan2(reference.dot(up))
    }

    /// Compare two poses component-wise within [`POSE_EPSILON`]
    pub fn approx_eq(&self, other: &CameraPose) -> bool {
        self.location.abs_diff_eq(other.location, POSE_EPSILON)
            && self.target.abs_diff_eq(other.target, POSE_EPSILON)
            && self.up.abs_diff_eq(other.up, POSE_EPSILON)
            && (self.lens_length - other.lens_length).abs() <= POSE_EPSILON
            && self.projection == other.projection
    }

    /// Blend towards another pose by an already eased amount.
    ///
    /// Roll takes the shortest way around; the projection stays that of `self`.
    pub fn blend(&self, other: &CameraPose, amount: f64) -> CameraPose {
        let start = self.roll();
        let end = shortest_roll(start, other.roll());
        let location = lerp_vec(self.location, other.location, amount);
        let target = lerp_vec(self.target, other.target, amount);

        CameraPose::from_roll(
            location,
            target,
            lerp(start, end, amount),
            lerp(self.lens_length, other.lens_length, amount),
            self.projection,
        )
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(
            DVec3::new(0.0, -10.0, 0.0),
            DVec3::ZERO,
            DVec3::Z,
            50.0,
            CameraProjection::Perspective,
        )
    }
}

/// Up direction for a camera at `location` looking at `target` with the given roll
pub fn up_from_roll(location: DVec3, target: DVec3, roll: f64) -> DVec3 {
    let forward = (target - location).normalize_or_zero();
    let reference = view_reference(forward);
    reference * roll.cos() + forward.cross(reference) * roll.sin()
}

/// World up projected into the view plane, falling back to +Y when looking along Z
fn view_reference(forward: DVec3) -> DVec3 {
    let reference = DVec3::Z - forward * forward.z;
    if reference.length_squared() > 1e-12 {
        return reference.normalize();
    }
    (DVec3::Y - forward * forward.y).normalize_or_zero()
}

/// Move `end` by whole turns so it lies within half a turn of `start`
fn shortest_roll(start: f64, end: f64) -> f64 {
    start + (end - start + PI).rem_euclid(TAU) - PI
}

fn lerp_vec(from: DVec3, to: DVec3, t: f64) -> DVec3 {
    from * (1.0 - t) + to * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_with_roll(roll: f64) -> CameraPose {
        CameraPose::from_roll(
            DVec3::new(10.0, -10.0, 5.0),
            DVec3::new(0.0, 0.0, 1.0),
            roll,
            35.0,
            CameraProjection::Perspective,
        )
    }

    #[test]
    fn test_default_pose_has_no_roll() {
        assert!(CameraPose::default().roll().abs() < 1e-12);
    }

    #[test]
    fn test_roll_round_trip() {
        for roll in [-3.0, -1.2, -0.1, 0.0, 0.4, 1.5, 3.0] {
            let pose = pose_with_roll(roll);
            assert!((pose.roll() - roll).abs() < 1e-9, "roll {roll}");
            assert!((pose.up.length() - 1.0).abs() < 1e-9);
            assert!(pose.up.dot(pose.forward()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_looking_straight_down() {
        let pose = CameraPose::from_roll(
            DVec3::new(0.0, 0.0, 10.0),
            DVec3::ZERO,
            0.7,
            50.0,
            CameraProjection::Parallel,
        );
        assert!((pose.roll() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let pose = pose_with_roll(0.2);
        let mut nudged = pose;
        nudged.location.x += 1e-7;
        nudged.lens_length += 1e-7;
        assert!(pose.approx_eq(&nudged));

        nudged.target.y += 1e-3;
        assert!(!pose.approx_eq(&nudged));

        let mut other_projection = pose;
        other_projection.projection = CameraProjection::Parallel;
        assert!(!pose.approx_eq(&other_projection));
    }

    #[test]
    fn test_blend_endpoints() {
        let a = pose_with_roll(0.1);
        let b = CameraPose::from_roll(
            DVec3::new(-4.0, 2.0, 8.0),
            DVec3::new(0.0, 0.0, 1.0),
            0.9,
            70.0,
            CameraProjection::Parallel,
        );

        assert!(a.blend(&b, 0.0).approx_eq(&a));
        assert!(a.blend(&b, 1.0).approx_eq(&CameraPose {
            projection: a.projection,
            ..b
        }));

        let mid = a.blend(&b, 0.5);
        assert!((mid.lens_length - 52.5).abs() < 1e-12);
        assert!(mid.location.abs_diff_eq(DVec3::new(3.0, -4.0, 6.5), 1e-12));
    }

    #[test]
    fn test_blend_takes_shortest_roll() {
        let a = pose_with_roll(3.0);
        let b = pose_with_roll(-3.0);
        let mid = a.blend(&b, 0.5);
        // Halfway between 3.0 and -3.0 the short way round is +/- PI
        assert!((mid.roll().abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_shortest_roll_wraps() {
        assert!((shortest_roll(3.0, -3.0) - (TAU - 3.0)).abs() < 1e-12);
        assert!((shortest_roll(-3.0, 3.0) - (3.0 - TAU)).abs() < 1e-12);
        assert!((shortest_roll(0.5, 1.0) - 1.0).abs() < 1e-12);
    }
}
