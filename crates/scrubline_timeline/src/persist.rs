// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted form of a timeline.
//!
//! A timeline is stored as a JSON tree of tagged records:
//!
//! ```json
//! {
//!   "version": 1,
//!   "settings": { "frame_rate": 30.0, "frame_count": 100 },
//!   "sequences": {
//!     "<uuid>": {
//!       "kind": "target_bound",
//!       "keyframes": [
//!         { "kind": "numeric", "time": 0.0, "ease_in": "Linear", "ease_out": "Linear", "value": 10.0 }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Loading fails closed per record: a sequence or keyframe with an unknown
//! tag or a bad payload is skipped and reported, the rest still loads.

use crate::keyframe::{Keyframe, KeyframeKind};
use crate::sequence::{Sequence, SequenceKind};
use crate::settings::TimelineSettings;
use crate::target::{TargetBinding, TargetId};
use crate::timeline::{Timeline, MAIN_CAMERA_SEQUENCE_ID};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Current timeline format version
pub const FORMAT_VERSION: u32 = 1;

/// Error that prevents a timeline from loading or saving at all
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The document is not valid JSON or has the wrong overall shape
    #[error("Malformed timeline document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was written by a newer version
    #[error("Timeline format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// A record that was skipped while loading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadIssue {
    /// Settings could not be read; defaults were used
    #[error("Invalid settings, using defaults: {reason}")]
    MalformedSettings {
        /// Parser message
        reason: String,
    },

    /// A sequence key is not a valid identity
    #[error("Invalid sequence key {key:?}")]
    InvalidSequenceKey {
        /// The rejected key
        key: String,
    },

    /// A sequence record has an unknown kind or bad shape
    #[error("Skipped sequence {id}: {reason}")]
    MalformedSequence {
        /// Key of the sequence
        id: TargetId,
        /// Parser message
        reason: String,
    },

    /// A keyframe record has an unknown kind or bad payload
    #[error("Skipped keyframe {index} of sequence {id}: {reason}")]
    MalformedKeyframe {
        /// Key of the owning sequence
        id: TargetId,
        /// Position of the record in the sequence
        index: usize,
        /// Parser message
        reason: String,
    },
}

/// A loaded timeline and the records that were skipped
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The timeline built from every valid record
    pub timeline: Timeline,
    /// Records that were rejected
    pub issues: Vec<LoadIssue>,
}

impl LoadOutcome {
    /// Whether every record loaded
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SequenceTag {
    TargetBound,
    Camera,
}

#[derive(Serialize)]
struct TimelineRecord<'a> {
    version: u32,
    settings: &'a TimelineSettings,
    sequences: IndexMap<TargetId, SequenceRecord<'a>>,
}

#[derive(Serialize)]
struct SequenceRecord<'a> {
    kind: SequenceTag,
    keyframes: Vec<&'a Keyframe>,
}

#[derive(Deserialize)]
struct RawTimeline {
    version: u32,
    #[serde(default)]
    settings: Option<Value>,
    #[serde(default)]
    sequences: IndexMap<String, Value>,
}

#[derive(Deserialize)]
struct RawSequence {
    kind: SequenceTag,
    #[serde(default)]
    keyframes: Vec<Value>,
}

impl Timeline {
    /// Serialize the timeline to JSON
    pub fn to_json(&self) -> Result<String, PersistError> {
        let sequences = self
            .sequences()
            .map(|(id, sequence)| {
                let kind = match sequence.kind() {
                    SequenceKind::TargetBound(_) => SequenceTag::TargetBound,
                    SequenceKind::Camera => SequenceTag::Camera,
                };
                let record = SequenceRecord {
                    kind,
                    keyframes: sequence.keyframes().collect(),
                };
                (id, record)
            })
            .collect();

        let record = TimelineRecord {
            version: FORMAT_VERSION,
            settings: &self.settings,
            sequences,
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }

    /// Load a timeline from JSON, skipping records that do not parse
    pub fn from_json(content: &str) -> Result<LoadOutcome, PersistError> {
        let raw: RawTimeline = serde_json::from_str(content)?;
        if raw.version > FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: raw.version,
                supported: FORMAT_VERSION,
            });
        }

        let mut issues = Vec::new();
        let settings = match raw.settings.map(serde_json::from_value::<TimelineSettings>) {
            None => TimelineSettings::default(),
            Some(Ok(settings)) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    issues.push(LoadIssue::MalformedSettings {
                        reason: e.to_string(),
                    });
                    TimelineSettings::default()
                }
            },
            Some(Err(e)) => {
                issues.push(LoadIssue::MalformedSettings {
                    reason: e.to_string(),
                });
                TimelineSettings::default()
            }
        };

        let mut timeline = Timeline::with_settings(settings);
        for (key, value) in raw.sequences {
            let Ok(uuid) = Uuid::parse_str(&key) else {
                issues.push(LoadIssue::InvalidSequenceKey { key });
                continue;
            };
            let id = TargetId(uuid);
            match load_sequence(id, value, &mut issues) {
                Ok(sequence) => {
                    timeline.insert_sequence(id, sequence);
                }
                Err(reason) => issues.push(LoadIssue::MalformedSequence { id, reason }),
            }
        }

        for issue in &issues {
            tracing::warn!("{}", issue);
        }
        tracing::info!(
            "Loaded timeline with {} sequences and {} keyframes",
            timeline.sequence_count(),
            timeline.keyframe_count()
        );
        Ok(LoadOutcome { timeline, issues })
    }
}

fn load_sequence(
    id: TargetId,
    value: Value,
    issues: &mut Vec<LoadIssue>,
) -> Result<Sequence, String> {
    let raw: RawSequence = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let kind = match raw.kind {
        SequenceTag::TargetBound if id == MAIN_CAMERA_SEQUENCE_ID => {
            return Err("the camera key is reserved for the camera sequence".to_string());
        }
        SequenceTag::Camera if id != MAIN_CAMERA_SEQUENCE_ID => {
            return Err(format!(
                "camera sequence must be stored under {}",
                MAIN_CAMERA_SEQUENCE_ID
            ));
        }
        SequenceTag::TargetBound => SequenceKind::TargetBound(TargetBinding::new(id)),
        SequenceTag::Camera => SequenceKind::Camera,
    };

    let mut sequence = Sequence::with_kind(kind);
    for (index, value) in raw.keyframes.into_iter().enumerate() {
        let reason = match serde_json::from_value::<Keyframe>(value) {
            Ok(keyframe) if fits(raw.kind, keyframe.kind()) => {
                sequence.add_keyframe(keyframe);
                continue;
            }
            Ok(keyframe) => format!(
                "{} keyframe does not belong in a {} sequence",
                keyframe.kind().name(),
                if raw.kind == SequenceTag::Camera { "camera" } else { "target-bound" }
            ),
            Err(e) => e.to_string(),
        };
        issues.push(LoadIssue::MalformedKeyframe { id, index, reason });
    }
    Ok(sequence)
}

/// Camera keyframes live only in the camera sequence, and nothing else does
fn fits(sequence: SequenceTag, keyframe: KeyframeKind) -> bool {
    (sequence == SequenceTag::Camera) == (keyframe == KeyframeKind::Camera)
}
