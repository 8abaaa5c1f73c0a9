//! Input recording and replay
//!
//! Because a tick is a pure function of (state, input, geometry), a recorded
//! input log reproduces a run exactly.

use serde::{Deserialize, Serialize};

use super::geometry::GeometryQuery;
use super::state::{Controller, ControllerSnapshot};
use super::tick::{StepError, TickInput};

/// Ordered per-tick inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputLog {
    pub frames: Vec<TickInput>,
}

impl InputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, input: TickInput) {
        self.frames.push(input);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Step `controller` through every frame, returning a snapshot per tick
    pub fn replay<Q: GeometryQuery + ?Sized>(
        &self,
        controller: &mut Controller,
        query: &Q,
    ) -> Result<Vec<ControllerSnapshot>, StepError> {
        let mut snapshots = Vec::with_capacity(self.frames.len());
        for input in &self.frames {
            controller.step(input, query)?;
            snapshots.push(controller.snapshot());
        }
        log::debug!("Replayed {} frames, final tick {}", self.frames.len(), controller.tick_count());
        Ok(snapshots)
    }
}
