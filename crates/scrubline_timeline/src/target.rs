// SPDX-License-Identifier: MIT OR Apache-2.0
//! External targets a timeline reads from and writes into.
//!
//! The engine never owns document objects. It talks to them through small
//! capability traits and finds them again by [`TargetId`] through a
//! [`Document`]. A [`TargetBinding`] keeps only a weak reference to the
//! resolved object.

use crate::camera::CameraPose;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Identity of a tracked document object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    /// Create a new random target ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Computation phase of a document object, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolutionPhase {
    /// Not computed yet in the current solution
    Blank,
    /// Results are up to date
    #[default]
    Computed,
    /// Last computation failed
    Failed,
}

/// Object whose whole state can be exported and imported as a string
pub trait StateTarget {
    /// Export the current state
    fn export_state(&self) -> String;
    /// Replace the current state
    fn import_state(&mut self, state: &str);
}

/// Object exposing a single decimal value
pub trait NumericTarget {
    /// Current value
    fn value(&self) -> f64;
    /// Set the value
    fn set_value(&mut self, value: f64);
}

/// The active viewport camera
pub trait CameraTarget {
    /// Current camera pose
    fn pose(&self) -> CameraPose;
    /// Move the camera
    fn set_pose(&mut self, pose: &CameraPose);
}

/// An object living in the host document
pub trait DocumentObject {
    /// Identity of this object
    fn id(&self) -> TargetId;

    /// Display name
    fn name(&self) -> String {
        self.id().to_string()
    }

    /// Computation phase; change propagation is skipped while `Blank`
    fn phase(&self) -> SolutionPhase {
        SolutionPhase::Computed
    }

    /// Ask the host to recompute this object
    fn expire_solution(&mut self) {}

    /// Numeric capability, if any
    fn as_numeric_target(&mut self) -> Option<&mut dyn NumericTarget> {
        None
    }

    /// Opaque state capability, if any
    fn as_state_target(&mut self) -> Option<&mut dyn StateTarget> {
        None
    }
}

/// Shared handle to a document object
pub type SharedObject = Rc<RefCell<dyn DocumentObject>>;

/// Resolves target identities to live objects
pub trait Document {
    /// Find a live object by identity
    fn resolve(&self, id: TargetId) -> Option<SharedObject>;
}

impl Document for HashMap<TargetId, SharedObject> {
    fn resolve(&self, id: TargetId) -> Option<SharedObject> {
        self.get(&id).cloned()
    }
}

/// Binding of a sequence to one document object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetBinding {
    /// Identity of the bound object
    id: TargetId,
    /// Last resolved object
    #[serde(skip)]
    cached: Option<Weak<RefCell<dyn DocumentObject>>>,
}

impl TargetBinding {
    /// Create a binding to an object
    pub fn new(id: TargetId) -> Self {
        Self { id, cached: None }
    }

    /// Identity of the bound object
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Rebind to another identity, dropping the cached object
    pub fn set_id(&mut self, id: TargetId) {
        if id != self.id {
            self.id = id;
            self.cached = None;
        }
    }

    /// Forget the cached object so the next lookup goes through the document
    pub fn detach(&mut self) {
        self.cached = None;
    }

    /// Whether a live object is currently cached
    pub fn is_attached(&self) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Resolve the bound object, reusing the cached one while it is alive
    pub fn resolve(&mut self, document: &dyn Document) -> Option<SharedObject> {
        if let Some(object) = self.cached.as_ref().and_then(Weak::upgrade) {
            return Some(object);
        }

        let object = document.resolve(self.id);
        self.cached = object.as_ref().map(Rc::downgrade);
        object
    }
}
