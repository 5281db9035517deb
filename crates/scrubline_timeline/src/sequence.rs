// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence of keyframes for one tracked target.
//!
//! Evaluating a sequence at a time finds the keyframes bracketing that time,
//! writes the (possibly blended) state into the target and reports whether
//! the write changed anything since the previous evaluation. Times before
//! the first keyframe clamp to it, times after the last clamp to the last;
//! there is no extrapolation.

use crate::easing::ease_in_out;
use crate::fingerprint::Fingerprint;
use crate::keyframe::{Keyframe, KeyframeId};
use crate::target::{CameraTarget, Document, SharedObject, TargetBinding, TargetId};
use std::cell::OnceCell;

/// What a sequence drives
#[derive(Debug, Clone)]
pub enum SequenceKind {
    /// One document object, found by identity
    TargetBound(TargetBinding),
    /// The active viewport camera
    Camera,
}

/// Whether a sequence can currently be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// The target is reachable
    Valid,
    /// The target cannot be reached, with a description of why
    Invalid(String),
}

impl Validity {
    /// Whether the sequence is valid
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Reason the sequence is invalid, if it is
    pub fn why_not(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Keyframes bracketing an evaluation time
#[derive(Debug, Clone, Copy)]
pub enum Segment<'a> {
    /// The time resolves to a single keyframe
    Exact(&'a Keyframe),
    /// The time falls strictly inside a segment
    Between {
        /// Keyframe at the start of the segment
        from: &'a Keyframe,
        /// Keyframe at the end of the segment
        to: &'a Keyframe,
        /// Eased position within the segment
        amount: f64,
    },
}

/// A sequence of keyframes driving one target
#[derive(Debug, Clone)]
pub struct Sequence {
    /// What this sequence drives
    kind: SequenceKind,
    /// Keyframes, unique by time, in insertion order
    keyframes: Vec<Keyframe>,
    /// Indices into `keyframes` ordered by time, rebuilt after every mutation
    ordered: OnceCell<Vec<usize>>,
    /// Fingerprint of the last state written into the target
    last_fingerprint: Fingerprint,
}

impl Sequence {
    /// Create a sequence bound to a document object
    pub fn target_bound(id: TargetId) -> Self {
        Self::with_kind(SequenceKind::TargetBound(TargetBinding::new(id)))
    }

    /// Create a sequence driving the viewport camera
    pub fn camera() -> Self {
        Self::with_kind(SequenceKind::Camera)
    }

    /// Create an empty sequence of the given kind
    pub fn with_kind(kind: SequenceKind) -> Self {
        Self {
            kind,
            keyframes: Vec::new(),
            ordered: OnceCell::new(),
            last_fingerprint: Fingerprint::Never,
        }
    }

    /// What this sequence drives
    pub fn kind(&self) -> &SequenceKind {
        &self.kind
    }

    /// Whether this sequence drives the viewport camera
    pub fn is_camera(&self) -> bool {
        matches!(self.kind, SequenceKind::Camera)
    }

    /// Identity of the bound object, for target-bound sequences
    pub fn target_id(&self) -> Option<TargetId> {
        match &self.kind {
            SequenceKind::TargetBound(binding) => Some(binding.id()),
            SequenceKind::Camera => None,
        }
    }

    /// Fingerprint of the last state written into the target
    pub fn last_fingerprint(&self) -> Fingerprint {
        self.last_fingerprint
    }

    /// Add a keyframe, replacing any keyframe at exactly the same time
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.retain(|k| k.time != keyframe.time);
        self.keyframes.push(keyframe);
        self.invalidate();
    }

    /// Remove a keyframe by ID
    pub fn remove(&mut self, keyframe_id: KeyframeId) -> bool {
        self.remove_where(|k| k.id == keyframe_id)
    }

    /// Remove the keyframe at exactly this time
    pub fn remove_at(&mut self, time: f64) -> bool {
        self.remove_where(|k| k.time == time)
    }

    fn remove_where(&mut self, predicate: impl Fn(&Keyframe) -> bool) -> bool {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| !predicate(k));
        let removed = self.keyframes.len() != before;
        if removed {
            self.invalidate();
        }
        removed
    }

    fn invalidate(&mut self) {
        self.ordered.take();
        self.last_fingerprint = Fingerprint::Never;
    }

    fn order(&self) -> &[usize] {
        self.ordered.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.keyframes.len()).collect();
            order.sort_by(|a, b| self.keyframes[*a].time.total_cmp(&self.keyframes[*b].time));
            order
        })
    }

    /// Keyframes ordered by time
    pub fn keyframes(&self) -> impl Iterator<Item = &Keyframe> + '_ {
        self.order().iter().map(|i| &self.keyframes[*i])
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == keyframe_id)
    }

    /// Get keyframe at exactly this time
    pub fn keyframe_at(&self, time: f64) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.time == time)
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the sequence has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Times of the first and last keyframes
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let order = self.order();
        let first = self.keyframes[*order.first()?].time;
        let last = self.keyframes[*order.last()?].time;
        Some((first, last))
    }

    /// Find the keyframes bracketing a time
    pub fn segment_at(&self, time: f64) -> Option<Segment<'_>> {
        let order = self.order();
        let first = &self.keyframes[*order.first()?];
        if order.len() == 1 || time <= first.time {
            return Some(Segment::Exact(first));
        }

        let last = &self.keyframes[order[order.len() - 1]];
        if time >= last.time {
            return Some(Segment::Exact(last));
        }

        for pair in order.windows(2) {
            let from = &self.keyframes[pair[0]];
            let to = &self.keyframes[pair[1]];
            if from.time <= time && time < to.time {
                let local = (time - from.time) / (to.time - from.time);
                return Some(Segment::Between {
                    from,
                    to,
                    amount: ease_in_out(local, from.ease_out, to.ease_in),
                });
            }
        }

        Some(Segment::Exact(last))
    }

    /// Resolve the bound object, for target-bound sequences
    pub fn target(&mut self, document: &dyn Document) -> Option<SharedObject> {
        match &mut self.kind {
            SequenceKind::TargetBound(binding) => binding.resolve(document),
            SequenceKind::Camera => None,
        }
    }

    /// Check whether the target can be reached
    pub fn validity(&mut self, document: &dyn Document) -> Validity {
        match &mut self.kind {
            SequenceKind::Camera => Validity::Valid,
            SequenceKind::TargetBound(binding) => {
                if binding.resolve(document).is_some() {
                    Validity::Valid
                } else {
                    Validity::Invalid(format!("Object not found with id {}", binding.id()))
                }
            }
        }
    }

    /// Display name of the driven target
    pub fn name(&mut self, document: &dyn Document) -> String {
        if self.is_camera() {
            return "Camera".to_string();
        }
        self.target(document)
            .and_then(|object| object.try_borrow().ok().map(|object| object.name()))
            .unwrap_or_else(|| "Missing".to_string())
    }

    /// Forget the cached target so it is looked up again on next use
    pub fn reattach(&mut self) {
        if let SequenceKind::TargetBound(binding) = &mut self.kind {
            binding.detach();
        }
        self.last_fingerprint = Fingerprint::Never;
    }

    /// Rebind a target-bound sequence to a new identity
    pub(crate) fn set_target_id(&mut self, id: TargetId) -> bool {
        match &mut self.kind {
            SequenceKind::TargetBound(binding) => {
                binding.set_id(id);
                true
            }
            SequenceKind::Camera => false,
        }
    }

    /// Evaluate the sequence at a time and write the result into its target.
    ///
    /// Returns `true` when the written state differs from the previous
    /// evaluation. Camera sequences need a camera; target-bound sequences
    /// ignore it.
    pub fn set_time<'a>(
        &mut self,
        time: f64,
        document: &dyn Document,
        camera: Option<&mut (dyn CameraTarget + 'a)>,
    ) -> bool {
        if self.is_empty() {
            return false;
        }
        if !time.is_finite() {
            tracing::debug!("Ignoring non-finite time {}", time);
            return false;
        }

        if self.is_camera() {
            return match camera {
                Some(camera) => self.set_camera_time(time, camera),
                None => false,
            };
        }
        self.set_target_time(time, document)
    }

    fn set_target_time(&mut self, time: f64, document: &dyn Document) -> bool {
        let Some(object) = self.target(document) else {
            tracing::debug!(
                "Skipping sequence for missing target {:?}",
                self.target_id()
            );
            return false;
        };
        let Ok(mut object) = object.try_borrow_mut() else {
            tracing::warn!("Target {:?} is busy, skipping evaluation", self.target_id());
            return false;
        };

        let fingerprint = match self.segment_at(time) {
            None => return false,
            Some(Segment::Exact(keyframe)) => keyframe.apply(&mut *object),
            Some(Segment::Between { from, to, amount }) => {
                from.interpolate(&mut *object, to, amount)
            }
        };

        let Some(fingerprint) = fingerprint else {
            tracing::warn!(
                "Target {} does not support the recorded keyframes",
                object.id()
            );
            return false;
        };

        if fingerprint == self.last_fingerprint {
            return false;
        }
        self.last_fingerprint = fingerprint;
        true
    }

    fn set_camera_time(&mut self, time: f64, camera: &mut dyn CameraTarget) -> bool {
        let changed = match self.segment_at(time) {
            None => None,
            Some(Segment::Exact(keyframe)) => keyframe.apply_camera(camera),
            Some(Segment::Between { from, to, amount }) => {
                from.interpolate_camera(camera, to, amount)
            }
        };
        changed.unwrap_or(false)
    }
}
