// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording session: turns edits made while recording into keyframes.
//!
//! The host reports the start and end of every solution. Objects that were
//! expired when a solution started are captured once it ends, at the current
//! timeline time. Solutions caused by scrubbing are never recorded, so
//! playback and capture do not feed each other.

use crate::target::{Document, SolutionPhase, TargetId};
use crate::timeline::Timeline;
use indexmap::IndexSet;

/// Capture loop state for one timeline
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    recording: bool,
    time_driven: bool,
    pending: IndexSet<TargetId>,
}

impl Recorder {
    /// Create a recorder that is not recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether edits are being recorded
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Start or stop recording. Stopping drops anything pending.
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording != recording {
            tracing::info!("Recording {}", if recording { "started" } else { "stopped" });
        }
        self.recording = recording;
        if !recording {
            self.pending.clear();
        }
    }

    /// Flag the next solution as caused by a time change
    pub fn mark_time_driven(&mut self) {
        self.time_driven = true;
    }

    /// Objects waiting to be captured
    pub fn pending(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.pending.iter().copied()
    }

    /// Note the candidates that are expired as a solution starts
    pub fn on_solution_start(
        &mut self,
        document: &dyn Document,
        candidates: impl IntoIterator<Item = TargetId>,
    ) {
        if !self.recording || self.time_driven {
            return;
        }

        for id in candidates {
            let Some(object) = document.resolve(id) else {
                continue;
            };
            let blank = object
                .try_borrow()
                .is_ok_and(|object| object.phase() == SolutionPhase::Blank);
            if blank {
                self.pending.insert(id);
            }
        }
    }

    /// Capture every pending object at `time`, returning how many keyframes were added
    pub fn on_solution_end(
        &mut self,
        timeline: &mut Timeline,
        document: &dyn Document,
        time: f64,
    ) -> usize {
        let time_driven = std::mem::take(&mut self.time_driven);
        let pending = std::mem::take(&mut self.pending);
        if !self.recording || time_driven {
            return 0;
        }

        let mut captured = 0;
        for id in pending {
            let Some(object) = document.resolve(id) else {
                tracing::warn!("Recorded object {} is gone", id);
                continue;
            };
            let Ok(mut object) = object.try_borrow_mut() else {
                tracing::warn!("Recorded object {} is busy", id);
                continue;
            };
            if timeline.try_add_keyframe(&mut *object, time) {
                captured += 1;
            }
        }
        if captured > 0 {
            tracing::debug!("Recorded {} keyframes at {}", captured, time);
        }
        captured
    }
}
