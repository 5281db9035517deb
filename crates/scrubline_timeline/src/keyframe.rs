// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the timeline.
//!
//! A keyframe is a recorded state at one point in normalized time. The
//! recorded payload is a [`KeyframeValue`]; each variant knows how to read
//! itself from a target (capture) and write itself back (apply, interpolate).

use crate::camera::CameraPose;
use crate::easing::{lerp, Easing};
use crate::fingerprint::Fingerprint;
use crate::target::{CameraTarget, DocumentObject};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of recorded state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyframeKind {
    /// Opaque serialized state
    State,
    /// Decimal value
    Numeric,
    /// Viewport camera pose
    Camera,
}

impl KeyframeKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::Numeric => "Numeric",
            Self::Camera => "Camera",
        }
    }
}

/// Value stored in a keyframe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyframeValue {
    /// Serialized state of an object
    State {
        /// The exported state string
        state: String,
    },
    /// Decimal value of an object
    Numeric {
        /// The recorded value
        value: f64,
    },
    /// Viewport camera pose
    Camera {
        /// The recorded pose
        pose: CameraPose,
    },
}

impl KeyframeValue {
    /// Kind of this value
    pub fn kind(&self) -> KeyframeKind {
        match self {
            Self::State { .. } => KeyframeKind::State,
            Self::Numeric { .. } => KeyframeKind::Numeric,
            Self::Camera { .. } => KeyframeKind::Camera,
        }
    }

    /// Get as number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric { value } => Some(*value),
            _ => None,
        }
    }

    /// Get as state string if possible
    pub fn as_state(&self) -> Option<&str> {
        match self {
            Self::State { state } => Some(state),
            _ => None,
        }
    }

    /// Get as camera pose if possible
    pub fn as_pose(&self) -> Option<&CameraPose> {
        match self {
            Self::Camera { pose } => Some(pose),
            _ => None,
        }
    }
}

/// A keyframe in a sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyframe {
    /// Runtime identity, not persisted
    #[serde(skip)]
    pub id: KeyframeId,
    /// Normalized time, conventionally in `[0, 1]`
    pub time: f64,
    /// Easing of the segment arriving at this keyframe
    #[serde(default)]
    pub ease_in: Easing,
    /// Easing of the segment leaving this keyframe
    #[serde(default)]
    pub ease_out: Easing,
    /// Recorded state
    #[serde(flatten)]
    pub value: KeyframeValue,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, value: KeyframeValue) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            ease_in: Easing::Linear,
            ease_out: Easing::Linear,
            value,
        }
    }

    /// Create a numeric keyframe
    pub fn numeric(time: f64, value: f64) -> Self {
        Self::new(time, KeyframeValue::Numeric { value })
    }

    /// Create an opaque state keyframe
    pub fn state(time: f64, state: impl Into<String>) -> Self {
        Self::new(time, KeyframeValue::State { state: state.into() })
    }

    /// Create a camera keyframe
    pub fn camera(time: f64, pose: CameraPose) -> Self {
        Self::new(time, KeyframeValue::Camera { pose })
    }

    /// Set both easings
    pub fn with_easing(mut self, ease_in: Easing, ease_out: Easing) -> Self {
        self.ease_in = ease_in;
        self.ease_out = ease_out;
        self
    }

    /// Set the incoming easing
    pub fn with_ease_in(mut self, ease_in: Easing) -> Self {
        self.ease_in = ease_in;
        self
    }

    /// Set the outgoing easing
    pub fn with_ease_out(mut self, ease_out: Easing) -> Self {
        self.ease_out = ease_out;
        self
    }

    /// Kind of recorded state
    pub fn kind(&self) -> KeyframeKind {
        self.value.kind()
    }

    /// Record the object's current state into this keyframe.
    ///
    /// Returns `None`, leaving the keyframe untouched, when the object lacks
    /// the capability this keyframe records.
    pub fn capture(&mut self, object: &mut dyn DocumentObject) -> Option<Fingerprint> {
        match &mut self.value {
            KeyframeValue::Numeric { value } => {
                *value = object.as_numeric_target()?.value();
                Some(Fingerprint::of_number(*value))
            }
            KeyframeValue::State { state } => {
                *state = object.as_state_target()?.export_state();
                Some(Fingerprint::of_state(state))
            }
            KeyframeValue::Camera { .. } => None,
        }
    }

    /// Record a camera pose into this keyframe; `false` for non-camera keyframes
    pub fn capture_pose(&mut self, camera: &dyn CameraTarget) -> bool {
        match &mut self.value {
            KeyframeValue::Camera { pose } => {
                *pose = camera.pose();
                true
            }
            _ => false,
        }
    }

    /// Write this keyframe's state into the object
    pub fn apply(&self, object: &mut dyn DocumentObject) -> Option<Fingerprint> {
        match &self.value {
            KeyframeValue::Numeric { value } => {
                object.as_numeric_target()?.set_value(*value);
                Some(Fingerprint::of_number(*value))
            }
            KeyframeValue::State { state } => {
                object.as_state_target()?.import_state(state);
                Some(Fingerprint::of_state(state))
            }
            KeyframeValue::Camera { .. } => None,
        }
    }

    /// Write a blend of this keyframe and `next` into the object.
    ///
    /// `amount` is the already eased position within the segment. Only
    /// numeric pairs blend; anything else holds this keyframe's state.
    pub fn interpolate(
        &self,
        object: &mut dyn DocumentObject,
        next: &Keyframe,
        amount: f64,
    ) -> Option<Fingerprint> {
        match (&self.value, &next.value) {
            (KeyframeValue::Numeric { value: from }, KeyframeValue::Numeric { value: to }) => {
                let value = lerp(*from, *to, amount);
                object.as_numeric_target()?.set_value(value);
                Some(Fingerprint::of_number(value))
            }
            _ => self.apply(object),
        }
    }

    /// Move the camera to this keyframe's pose.
    ///
    /// Returns `Some(true)` when the camera moved, `Some(false)` when it was
    /// already there and `None` for non-camera keyframes.
    pub fn apply_camera(&self, camera: &mut dyn CameraTarget) -> Option<bool> {
        let pose = self.value.as_pose()?;
        Some(write_pose(camera, pose))
    }

    /// Move the camera to a blend of this keyframe's pose and `next`'s
    pub fn interpolate_camera(
        &self,
        camera: &mut dyn CameraTarget,
        next: &Keyframe,
        amount: f64,
    ) -> Option<bool> {
        let from = self.value.as_pose()?;
        match next.value.as_pose() {
            Some(to) => Some(write_pose(camera, &from.blend(to, amount))),
            None => Some(write_pose(camera, from)),
        }
    }
}

fn write_pose(camera: &mut dyn CameraTarget, pose: &CameraPose) -> bool {
    if pose.approx_eq(&camera.pose()) {
        return false;
    }
    camera.set_pose(pose);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Inert, Panel, Slider, Viewport};
    use glam::DVec3;

    #[test]
    fn test_capture_numeric() {
        let mut slider = Slider::new(4.25);
        let mut keyframe = Keyframe::numeric(0.5, 0.0);
        assert_eq!(keyframe.capture(&mut slider), Some(Fingerprint::of_number(4.25)));
        assert_eq!(keyframe.value.as_number(), Some(4.25));
    }

    #[test]
    fn test_capture_state() {
        let panel = Panel::shared("hello");
        let mut keyframe = Keyframe::state(0.1, "");
        let fingerprint = keyframe.capture(&mut *panel.borrow_mut());
        assert_eq!(fingerprint, Some(Fingerprint::of_state("hello")));
        assert_eq!(keyframe.value.as_state(), Some("hello"));
    }

    #[test]
    fn test_capture_unsupported_target() {
        let inert = Inert::shared();
        let mut keyframe = Keyframe::numeric(0.0, 7.0);
        assert_eq!(keyframe.capture(&mut *inert.borrow_mut()), None);
        assert_eq!(keyframe.value.as_number(), Some(7.0));

        let mut slider = Slider::new(1.0);
        let mut camera = Keyframe::camera(0.0, CameraPose::default());
        assert_eq!(camera.capture(&mut slider), None);
    }

    #[test]
    fn test_apply_numeric() {
        let mut slider = Slider::new(0.0);
        let keyframe = Keyframe::numeric(0.0, 12.5);
        assert_eq!(keyframe.apply(&mut slider), Some(Fingerprint::of_number(12.5)));
        assert_eq!(slider.value, 12.5);
    }

    #[test]
    fn test_interpolate_numeric() {
        let mut slider = Slider::new(0.0);
        let a = Keyframe::numeric(0.0, 10.0);
        let b = Keyframe::numeric(1.0, 20.0);
        assert_eq!(a.interpolate(&mut slider, &b, 0.25), Some(Fingerprint::of_number(12.5)));
        assert_eq!(slider.value, 12.5);
    }

    #[test]
    fn test_interpolate_state_holds() {
        let panel = Panel::shared("");
        let a = Keyframe::state(0.0, "first");
        let b = Keyframe::state(1.0, "second");
        a.interpolate(&mut *panel.borrow_mut(), &b, 0.9);
        assert_eq!(panel.borrow().text, "first");
    }

    #[test]
    fn test_interpolate_mismatched_kinds_holds() {
        let mut slider = Slider::new(0.0);
        let a = Keyframe::numeric(0.0, 3.0);
        let b = Keyframe::state(1.0, "oops");
        assert_eq!(a.interpolate(&mut slider, &b, 0.5), Some(Fingerprint::of_number(3.0)));
        assert_eq!(slider.value, 3.0);
    }

    #[test]
    fn test_camera_apply_skips_identical_pose() {
        let mut viewport = Viewport::default();
        let keyframe = Keyframe::camera(0.0, viewport.pose);
        assert_eq!(keyframe.apply_camera(&mut viewport), Some(false));
        assert_eq!(viewport.writes, 0);

        let mut moved = viewport.pose;
        moved.location = DVec3::new(5.0, 5.0, 5.0);
        let keyframe = Keyframe::camera(0.0, moved);
        assert_eq!(keyframe.apply_camera(&mut viewport), Some(true));
        assert_eq!(viewport.writes, 1);
        assert!(viewport.pose.approx_eq(&moved));
    }

    #[test]
    fn test_camera_methods_reject_other_kinds() {
        let mut viewport = Viewport::default();
        let keyframe = Keyframe::numeric(0.0, 1.0);
        assert_eq!(keyframe.apply_camera(&mut viewport), None);
        assert_eq!(keyframe.interpolate_camera(&mut viewport, &keyframe, 0.5), None);

        let mut numeric = Keyframe::numeric(0.0, 1.0);
        assert!(!numeric.capture_pose(&viewport));
    }

    #[test]
    fn test_record_shape() {
        let keyframe = Keyframe::numeric(0.25, 3.5).with_easing(Easing::Cubic, Easing::None);
        let json = serde_json::to_value(&keyframe).unwrap();
        assert_eq!(json["kind"], "numeric");
        assert_eq!(json["time"], 0.25);
        assert_eq!(json["ease_in"], "Cubic");
        assert_eq!(json["ease_out"], "None");
        assert_eq!(json["value"], 3.5);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"kind":"color","time":0.0,"value":[1,0,0]}"#;
        assert!(serde_json::from_str::<Keyframe>(json).is_err());

        let json = r#"{"time":0.0,"value":1.0}"#;
        assert!(serde_json::from_str::<Keyframe>(json).is_err());
    }

    #[test]
    fn test_missing_easing_defaults_to_linear() {
        let json = r#"{"kind":"state","time":0.5,"state":"abc"}"#;
        let keyframe: Keyframe = serde_json::from_str(json).unwrap();
        assert_eq!(keyframe.ease_in, Easing::Linear);
        assert_eq!(keyframe.ease_out, Easing::Linear);
        assert_eq!(keyframe.value.as_state(), Some("abc"));
    }
}
