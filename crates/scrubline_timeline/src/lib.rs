// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline engine for node-graph documents.
//!
//! A timeline records values of document objects at normalized times in
//! `0.0..=1.0` and writes interpolated values back while the user scrubs:
//! - Eased keyframes holding numbers, opaque state or camera poses
//! - Sequences that bracket a time, clamp outside their range and blend
//! - A registry of sequences keyed by target identity, plus one camera sequence
//! - Change fingerprints so targets only recompute when their value moved
//!
//! ## Architecture
//!
//! The engine is built on:
//! - Capability traits implemented by the host's objects ([`NumericTarget`],
//!   [`StateTarget`], [`CameraTarget`])
//! - Weak, re-resolvable bindings to those objects through a [`Document`]
//! - JSON persistence that skips bad records instead of failing the load
//! - RON settings for frame rate and frame count

pub mod camera;
pub mod easing;
pub mod fingerprint;
pub mod keyframe;
pub mod persist;
pub mod recorder;
pub mod sequence;
pub mod settings;
pub mod target;
pub mod timeline;

#[cfg(test)]
mod testing;

pub use camera::{CameraPose, CameraProjection, POSE_EPSILON};
pub use easing::Easing;
pub use fingerprint::Fingerprint;
pub use keyframe::{Keyframe, KeyframeId, KeyframeKind, KeyframeValue};
pub use persist::{LoadIssue, LoadOutcome, PersistError, FORMAT_VERSION};
pub use recorder::Recorder;
pub use sequence::{Segment, Sequence, SequenceKind, Validity};
pub use settings::{SettingsError, TimelineSettings};
pub use target::{
    CameraTarget, Document, DocumentObject, NumericTarget, SharedObject, SolutionPhase,
    StateTarget, TargetBinding, TargetId,
};
pub use timeline::{Timeline, MAIN_CAMERA_SEQUENCE_ID};
