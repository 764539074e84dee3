//! Boundary checkers
//!
//! A checker is a scene node that probes a short vertical segment through
//! its own position every tick. No hit means no chunk marker there, and the
//! gap is reported as [`ChunkMissing`].

use crate::error::Result;
use crate::events::ChunkMissing;
use strider_core::{Id, Shared};
use strider_event::EventBus;
use strider_math::Vec2;
use strider_scene::{ContentFactory, PrefabKind, SceneGraph, Stage, WorldProbe};

/// Handle to a checker node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checker {
    id: Id,
    extent: Vec2,
}

impl Checker {
    /// Instantiate a checker under `parent` at `position` (local), enabled
    pub fn create<S>(scene: &mut S, parent: Id, position: Vec2, extent: Vec2) -> Result<Self>
    where
        S: ContentFactory + SceneGraph,
    {
        let id = scene.instantiate(PrefabKind::Checker, position)?;
        scene.reparent(id, Some(parent), false)?;
        scene.set_local_position(id, position)?;
        scene.set_active(id, true)?;
        Ok(Self { id, extent })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Toggle probing. Disabling a disabled checker is a no-op.
    pub fn set_enabled<S: SceneGraph>(&self, scene: &mut S, enabled: bool) -> Result<()> {
        scene.set_active(self.id, enabled)?;
        Ok(())
    }

    pub fn is_enabled<S: SceneGraph>(&self, scene: &S) -> bool {
        scene.is_active_in_hierarchy(self.id)
    }

    /// Upper and lower probe points in world space
    pub fn probe_points<S: SceneGraph>(&self, scene: &S) -> Option<(Vec2, Vec2)> {
        let position = scene.world_position(self.id)?;
        Some((
            position.translate(0.0, self.extent.y),
            position.translate(0.0, -self.extent.y),
        ))
    }

    /// Probe once. Returns the event to publish when nothing was hit;
    /// disabled checkers never report.
    pub fn probe<S>(&self, scene: &S) -> Option<ChunkMissing>
    where
        S: WorldProbe + SceneGraph,
    {
        if !self.is_enabled(scene) {
            return None;
        }
        let (upper, lower) = self.probe_points(scene)?;
        if scene.line_probe(upper, lower) > 0 {
            return None;
        }
        log::debug!("Checker {} found no chunk at {:?}", self.id, lower);
        Some(ChunkMissing::new(self.id, lower))
    }

    /// Probe and publish. The scene lock is released before raising.
    pub fn update<S: Stage>(&self, bus: &mut EventBus, scene: &Shared<S>) -> bool {
        let missing = self.probe(&*scene.lock());
        match missing {
            Some(mut event) => {
                bus.raise(&mut event);
                true
            }
            None => false,
        }
    }
}
