//! Boundary destroyers

use crate::error::Result;
use crate::events::ChunkDestroying;
use strider_core::{Id, Shared};
use strider_event::EventBus;
use strider_math::Vec2;
use strider_scene::{ContentFactory, PrefabKind, SceneGraph, CHUNK_WRAPPER_TAG};

/// Handle to a destroyer node carrying a trigger collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destroyer {
    id: Id,
}

impl Destroyer {
    /// Instantiate a destroyer under `parent` at `position` (local), enabled
    pub fn create<S>(scene: &mut S, parent: Id, position: Vec2) -> Result<Self>
    where
        S: ContentFactory + SceneGraph,
    {
        let id = scene.instantiate(PrefabKind::Destroyer, position)?;
        scene.reparent(id, Some(parent), false)?;
        scene.set_local_position(id, position)?;
        let destroyer = Self { id };
        destroyer.set_enabled(scene, true)?;
        Ok(destroyer)
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Arm or disarm. The trigger collider and the node's active flag
    /// always change together.
    pub fn set_enabled<S: SceneGraph>(&self, scene: &mut S, enabled: bool) -> Result<()> {
        scene.set_collider_enabled(self.id, enabled)?;
        scene.set_active(self.id, enabled)?;
        Ok(())
    }

    pub fn is_enabled<S: SceneGraph>(&self, scene: &S) -> bool {
        scene.is_active_in_hierarchy(self.id)
            && scene.collider(self.id).map_or(false, |c| c.enabled)
    }

    /// Walk from `node` outward to the nearest node tagged as a chunk
    /// wrapper, `node` itself included.
    pub fn find_chunk<S: SceneGraph>(scene: &S, node: Id) -> Option<Id> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if scene.tag(current) == Some(CHUNK_WRAPPER_TAG) {
                return Some(current);
            }
            cursor = scene.parent(current);
        }
        None
    }

    /// The event to publish for a contact with `node`: `Some` when the
    /// destroyer is armed and `node` belongs to a chunk wrapper
    pub fn destroy_event<S: SceneGraph>(&self, scene: &S, node: Id) -> Option<ChunkDestroying> {
        if !self.is_enabled(scene) {
            return None;
        }
        match Self::find_chunk(scene, node) {
            Some(chunk) => Some(ChunkDestroying::new(self.id, chunk)),
            None => {
                log::trace!("Destroyer {} touched {} outside any chunk", self.id, node);
                None
            }
        }
    }

    /// Called on contact with `node`. Publishes [`ChunkDestroying`] when
    /// there is a chunk to report. The scene lock is released before raising.
    pub fn trigger_destroy<S: SceneGraph>(
        &self,
        bus: &mut EventBus,
        scene: &Shared<S>,
        node: Id,
    ) -> bool {
        let event = self.destroy_event(&*scene.lock(), node);
        match event {
            Some(mut event) => {
                bus.raise(&mut event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use strider_core::shared;
    use strider_scene::{PrefabLibrary, Scene};

    fn setup() -> (Scene, Destroyer) {
        let mut scene = Scene::new(PrefabLibrary::standard(16.0));
        let parent = scene.spawn("Destroyers", None, Vec2::ZERO).unwrap();
        let destroyer = Destroyer::create(&mut scene, parent, Vec2::new(-40.0, -10.0)).unwrap();
        (scene, destroyer)
    }

    #[test]
    fn test_enable_toggles_collider_and_node_together() {
        let (mut scene, destroyer) = setup();
        assert!(destroyer.is_enabled(&scene));

        destroyer.set_enabled(&mut scene, false).unwrap();
        assert!(!scene.is_active(destroyer.id()));
        assert!(!scene.collider(destroyer.id()).unwrap().enabled);
        assert!(!destroyer.is_enabled(&scene));

        destroyer.set_enabled(&mut scene, true).unwrap();
        assert!(scene.is_active(destroyer.id()));
        assert!(scene.collider(destroyer.id()).unwrap().enabled);
    }

    #[test]
    fn test_tag_walk_finds_wrapper_from_marker() {
        let (mut scene, destroyer) = setup();
        let wrapper = scene.instantiate(PrefabKind::ChunkWrapper, Vec2::ZERO).unwrap();
        let marker = scene.children(wrapper)[0];

        let event = destroyer.destroy_event(&scene, marker).unwrap();
        assert_eq!(event.chunk, wrapper);
        assert_eq!(event.destroyer, destroyer.id());
        assert_eq!(Destroyer::find_chunk(&scene, wrapper), Some(wrapper));
    }

    #[test]
    fn test_tag_walk_without_wrapper_reports_nothing() {
        let (mut scene, destroyer) = setup();
        let root = scene.spawn("Loose", None, Vec2::ZERO).unwrap();
        let child = scene.spawn("Child", Some(root), Vec2::ZERO).unwrap();

        assert_eq!(Destroyer::find_chunk(&scene, child), None);
        assert!(destroyer.destroy_event(&scene, child).is_none());
    }

    #[test]
    fn test_trigger_publishes_on_the_bus() {
        let (mut raw, destroyer) = setup();
        let wrapper = raw.instantiate(PrefabKind::ChunkWrapper, Vec2::ZERO).unwrap();
        let marker = raw.children(wrapper)[0];
        let loose = raw.spawn("Loose", None, Vec2::ZERO).unwrap();
        let scene = shared(raw);

        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.add_listener(move |e: &mut ChunkDestroying| sink.lock().push((e.destroyer, e.chunk)));

        assert!(destroyer.trigger_destroy(&mut bus, &scene, marker));
        assert!(!destroyer.trigger_destroy(&mut bus, &scene, loose));
        assert_eq!(*seen.lock(), vec![(destroyer.id(), wrapper)]);
    }

    #[test]
    fn test_disarmed_destroyer_never_fires() {
        let (mut scene, destroyer) = setup();
        let wrapper = scene.instantiate(PrefabKind::ChunkWrapper, Vec2::ZERO).unwrap();
        destroyer.set_enabled(&mut scene, false).unwrap();

        assert!(destroyer.destroy_event(&scene, wrapper).is_none());
    }
}
