// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory document objects shared by the unit tests.

use crate::camera::CameraPose;
use crate::target::{
    CameraTarget, DocumentObject, NumericTarget, SharedObject, SolutionPhase, StateTarget,
    TargetId,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Route engine logs to the test output; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a document from a set of objects
pub fn document_with(
    objects: impl IntoIterator<Item = SharedObject>,
) -> HashMap<TargetId, SharedObject> {
    objects
        .into_iter()
        .map(|object| {
            let id = object.borrow().id();
            (id, object)
        })
        .collect()
}

/// Number slider
#[derive(Debug)]
pub struct Slider {
    pub id: TargetId,
    pub value: f64,
    pub phase: SolutionPhase,
    pub writes: usize,
    pub expirations: usize,
}

impl Slider {
    pub fn new(value: f64) -> Self {
        Self {
            id: TargetId::new(),
            value,
            phase: SolutionPhase::Computed,
            writes: 0,
            expirations: 0,
        }
    }

    pub fn shared(value: f64) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(value)))
    }
}

impl NumericTarget for Slider {
    fn value(&self) -> f64 {
        self.value
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
        self.writes += 1;
    }
}

impl DocumentObject for Slider {
    fn id(&self) -> TargetId {
        self.id
    }

    fn name(&self) -> String {
        "Slider".to_string()
    }

    fn phase(&self) -> SolutionPhase {
        self.phase
    }

    fn expire_solution(&mut self) {
        self.expirations += 1;
    }

    fn as_numeric_target(&mut self) -> Option<&mut dyn NumericTarget> {
        Some(self)
    }
}

/// Object with an opaque string state
#[derive(Debug)]
pub struct Panel {
    pub id: TargetId,
    pub text: String,
    pub phase: SolutionPhase,
    pub expirations: usize,
}

impl Panel {
    pub fn shared(text: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            id: TargetId::new(),
            text: text.to_string(),
            phase: SolutionPhase::Computed,
            expirations: 0,
        }))
    }
}

impl StateTarget for Panel {
    fn export_state(&self) -> String {
        self.text.clone()
    }

    fn import_state(&mut self, state: &str) {
        self.text = state.to_string();
    }
}

impl DocumentObject for Panel {
    fn id(&self) -> TargetId {
        self.id
    }

    fn phase(&self) -> SolutionPhase {
        self.phase
    }

    fn expire_solution(&mut self) {
        self.expirations += 1;
    }

    fn as_state_target(&mut self) -> Option<&mut dyn StateTarget> {
        Some(self)
    }
}

/// Object without any capability the timeline understands
#[derive(Debug)]
pub struct Inert {
    pub id: TargetId,
    pub phase: SolutionPhase,
}

impl Inert {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            id: TargetId::new(),
            phase: SolutionPhase::Computed,
        }))
    }
}

impl DocumentObject for Inert {
    fn id(&self) -> TargetId {
        self.id
    }

    fn phase(&self) -> SolutionPhase {
        self.phase
    }
}

/// Viewport camera
#[derive(Debug, Default)]
pub struct Viewport {
    pub pose: CameraPose,
    pub writes: usize,
}

impl CameraTarget for Viewport {
    fn pose(&self) -> CameraPose {
        self.pose
    }

    fn set_pose(&mut self, pose: &CameraPose) {
        self.pose = *pose;
        self.writes += 1;
    }
}
