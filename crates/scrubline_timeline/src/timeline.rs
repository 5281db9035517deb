// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline: the registry of sequences for one document.

use crate::camera::CameraPose;
use crate::keyframe::Keyframe;
use crate::sequence::Sequence;
use crate::settings::TimelineSettings;
use crate::target::{CameraTarget, Document, DocumentObject, SolutionPhase, TargetId};
use indexmap::IndexMap;
use uuid::Uuid;

/// Key of the single camera sequence in every timeline
pub const MAIN_CAMERA_SEQUENCE_ID: TargetId =
    TargetId(Uuid::from_u128(0x4b74_bbb9_1713_4206_9124_68fd_901f_a036));

/// All sequences recorded for one document
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    /// Sequences keyed by the identity of what they drive
    sequences: IndexMap<TargetId, Sequence>,
    /// Frame rate and frame count
    pub settings: TimelineSettings,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty timeline with the given settings
    pub fn with_settings(settings: TimelineSettings) -> Self {
        Self {
            sequences: IndexMap::new(),
            settings,
        }
    }

    /// Get sequence count
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Total number of keyframes across all sequences
    pub fn keyframe_count(&self) -> usize {
        self.sequences.values().map(Sequence::keyframe_count).sum()
    }

    /// Get all sequences with their keys
    pub fn sequences(&self) -> impl Iterator<Item = (TargetId, &Sequence)> {
        self.sequences.iter().map(|(id, sequence)| (*id, sequence))
    }

    /// Get a sequence
    pub fn sequence(&self, id: TargetId) -> Option<&Sequence> {
        self.sequences.get(&id)
    }

    /// Get a mutable sequence
    pub fn sequence_mut(&mut self, id: TargetId) -> Option<&mut Sequence> {
        self.sequences.get_mut(&id)
    }

    /// Whether a sequence exists for this identity
    pub fn contains_sequence(&self, id: TargetId) -> bool {
        self.sequences.contains_key(&id)
    }

    /// Get the sequence for an identity, creating it with `factory` if missing
    pub fn ensure_sequence(
        &mut self,
        id: TargetId,
        factory: impl FnOnce() -> Sequence,
    ) -> &mut Sequence {
        self.sequences.entry(id).or_insert_with(factory)
    }

    /// Insert a sequence, returning the one it replaced
    pub fn insert_sequence(&mut self, id: TargetId, sequence: Sequence) -> Option<Sequence> {
        self.sequences.insert(id, sequence)
    }

    /// Key under which this exact sequence instance is registered.
    ///
    /// Removing a sequence held by reference goes through its key:
    /// `timeline.key_of(sequence).map(|id| timeline.remove_sequence(id))`.
    pub fn key_of(&self, sequence: &Sequence) -> Option<TargetId> {
        self.sequences
            .iter()
            .find(|(_, candidate)| std::ptr::eq(*candidate, sequence))
            .map(|(id, _)| *id)
    }

    /// Remove a sequence
    pub fn remove_sequence(&mut self, id: TargetId) -> bool {
        self.take_sequence(id).is_some()
    }

    /// Remove a sequence and hand it back
    pub fn take_sequence(&mut self, id: TargetId) -> Option<Sequence> {
        self.sequences.shift_remove(&id)
    }

    /// The camera sequence, if camera animation is enabled
    pub fn camera_sequence(&self) -> Option<&Sequence> {
        self.sequence(MAIN_CAMERA_SEQUENCE_ID)
    }

    /// Whether the viewport camera is animated
    pub fn animates_camera(&self) -> bool {
        self.contains_sequence(MAIN_CAMERA_SEQUENCE_ID)
    }

    /// Enable or disable camera animation.
    ///
    /// Disabling drops the camera sequence along with its keyframes.
    pub fn set_animate_camera(&mut self, enabled: bool) {
        if enabled {
            self.ensure_sequence(MAIN_CAMERA_SEQUENCE_ID, Sequence::camera);
        } else {
            self.remove_sequence(MAIN_CAMERA_SEQUENCE_ID);
        }
    }

    /// Evaluate every sequence at a new time.
    ///
    /// Each target-bound sequence that reports a change asks its own object
    /// to recompute, unless the object has not been computed yet. Unrelated
    /// objects are left alone.
    pub fn on_time_changed<'a>(
        &mut self,
        time: f64,
        document: &dyn Document,
        mut camera: Option<&mut (dyn CameraTarget + 'a)>,
    ) {
        for sequence in self.sequences.values_mut() {
            if sequence.set_time(time, document, camera.as_deref_mut()) {
                propagate_change(sequence, document);
            }
        }
    }

    /// Record the object's numeric value at a time
    pub fn add_numeric_keyframe(&mut self, object: &mut dyn DocumentObject, time: f64) -> bool {
        self.capture(object, Keyframe::numeric(time, 0.0))
    }

    /// Record the object's exported state at a time
    pub fn add_state_keyframe(&mut self, object: &mut dyn DocumentObject, time: f64) -> bool {
        self.capture(object, Keyframe::state(time, String::new()))
    }

    /// Record a camera pose at a time
    pub fn add_camera_keyframe(&mut self, pose: CameraPose, time: f64) {
        self.ensure_sequence(MAIN_CAMERA_SEQUENCE_ID, Sequence::camera)
            .add_keyframe(Keyframe::camera(time, pose));
    }

    /// Record the camera's current pose at a time
    pub fn capture_camera(&mut self, camera: &dyn CameraTarget, time: f64) {
        self.add_camera_keyframe(camera.pose(), time);
    }

    /// Record whatever the object supports at a time.
    ///
    /// Numeric values take precedence over exported state. Returns `false`
    /// when the object supports neither.
    pub fn try_add_keyframe(&mut self, object: &mut dyn DocumentObject, time: f64) -> bool {
        if object.as_numeric_target().is_some() {
            return self.add_numeric_keyframe(object, time);
        }
        if object.as_state_target().is_some() {
            return self.add_state_keyframe(object, time);
        }
        tracing::debug!("Object {} cannot be recorded", object.id());
        false
    }

    fn capture(&mut self, object: &mut dyn DocumentObject, mut keyframe: Keyframe) -> bool {
        if keyframe.capture(object).is_none() {
            tracing::debug!(
                "Object {} has no {} capability",
                object.id(),
                keyframe.kind().name()
            );
            return false;
        }

        let id = object.id();
        tracing::debug!(
            "Recorded {} keyframe for {} at {}",
            keyframe.kind().name(),
            id,
            keyframe.time
        );
        self.ensure_sequence(id, || Sequence::target_bound(id))
            .add_keyframe(keyframe);
        true
    }

    /// Rebind every target-bound sequence after the document was replaced.
    ///
    /// Returns the identities that no longer resolve.
    pub fn reattach(&mut self, document: &dyn Document) -> Vec<TargetId> {
        let mut missing = Vec::new();
        for (id, sequence) in &mut self.sequences {
            if sequence.is_camera() {
                continue;
            }
            sequence.reattach();
            if sequence.target(document).is_none() {
                missing.push(*id);
            }
        }
        if !missing.is_empty() {
            tracing::warn!("{} sequence targets could not be found", missing.len());
        }
        missing
    }

    /// Move a sequence to a new identity when its object's identifier changes
    pub fn on_identity_changed(&mut self, old_id: TargetId, new_id: TargetId) -> bool {
        if old_id == new_id
            || new_id == MAIN_CAMERA_SEQUENCE_ID
            || self.contains_sequence(new_id)
        {
            return false;
        }
        let Some(index) = self.sequences.get_index_of(&old_id) else {
            return false;
        };
        if self.sequences[index].is_camera() {
            return false;
        }

        let Some(mut sequence) = self.sequences.shift_remove(&old_id) else {
            return false;
        };
        sequence.set_target_id(new_id);
        self.sequences.insert(new_id, sequence);
        tracing::debug!("Sequence {} renamed to {}", old_id, new_id);
        true
    }

    /// Drop the sequences of deleted objects, returning how many were removed
    pub fn on_objects_deleted(&mut self, ids: impl IntoIterator<Item = TargetId>) -> usize {
        ids.into_iter()
            .filter(|id| self.remove_sequence(*id))
            .count()
    }

    /// Drop sequences without keyframes, returning how many were removed.
    ///
    /// The camera sequence stays while camera animation is enabled.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.sequences.len();
        self.sequences
            .retain(|_, sequence| sequence.is_camera() || !sequence.is_empty());
        before - self.sequences.len()
    }
}

fn propagate_change(sequence: &mut Sequence, document: &dyn Document) {
    let Some(object) = sequence.target(document) else {
        return;
    };
    let Ok(mut object) = object.try_borrow_mut() else {
        return;
    };
    if object.phase() != SolutionPhase::Blank {
        object.expire_solution();
    }
}
