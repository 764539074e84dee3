//! Streaming coordinator
//!
//! Owns the checkers and destroyers hosted under the streaming node and
//! reacts to their events:
//!
//! - [`ChunkMissing`]: load the chunk containing the reported point, and
//!   retire the reporting checker unless it is an edge checker
//! - [`ChunkDestroying`]: remove the reported chunk wrapper
//! - [`FacingChanged`]: move the edge checkers to the new front, arm the
//!   trailing destroyer and disarm the leading one
//!
//! Checker and destroyer facing are tracked separately and both start
//! unset, so the facing applied on attach is always a real transition.
//!
//! State reachable from listeners is behind [`Shared`] handles. Locks are
//! always taken coordinator state first, then scene, and never held while
//! an event is raised.

use crate::checker::Checker;
use crate::config::StreamingConfig;
use crate::destroyer::Destroyer;
use crate::error::{Result, StreamingError};
use crate::events::{ChunkDestroying, ChunkMissing};
use crate::layout::StreamingLayout;
use std::sync::Arc;
use strider_character::{Facing, FacingChanged};
use strider_core::{shared, Id, Shared};
use strider_event::{EventBus, ListenerId};
use strider_math::Vec2;
use strider_scene::{Contact, PrefabKind, SceneError, SceneGraph, Stage, CHUNK_WRAPPER_TAG};

/// Name of the node grouping every checker
pub const CHECKERS_NAME: &str = "Checkers";

/// Name of the node grouping both destroyers
pub const DESTROYERS_NAME: &str = "Destroyers";

#[derive(Debug)]
struct StreamerState {
    config: StreamingConfig,
    layout: StreamingLayout,
    host: Id,
    repository: Id,
    checkers_parent: Id,
    destroyers_parent: Id,
    middle: Vec<Checker>,
    /// Enabled edge checker, in the facing side's slot
    front: Checker,
    /// Disabled edge checker, parked in the opposite slot
    back: Checker,
    left_destroyer: Destroyer,
    right_destroyer: Destroyer,
    checker_facing: Option<Facing>,
    destroyer_facing: Option<Facing>,
}

impl StreamerState {
    fn is_edge(&self, checker: Id) -> bool {
        checker == self.front.id() || checker == self.back.id()
    }

    /// False once a later attach on the same node has replaced our nodes
    fn is_attached<S: SceneGraph>(&self, scene: &S) -> bool {
        scene.contains(self.checkers_parent) && scene.contains(self.destroyers_parent)
    }

    fn checkers(&self) -> Vec<Checker> {
        let mut all = self.middle.clone();
        all.push(self.front);
        all.push(self.back);
        all
    }

    fn apply_facing<S: SceneGraph>(&mut self, scene: &mut S, facing: Facing) -> Result<()> {
        self.set_checker_facing(scene, facing)?;
        self.set_destroyer_facing(scene, facing)?;
        Ok(())
    }

    fn set_checker_facing<S: SceneGraph>(&mut self, scene: &mut S, facing: Facing) -> Result<bool> {
        if self.checker_facing == Some(facing) {
            return Ok(false);
        }
        self.checker_facing = Some(facing);

        scene.set_local_position(self.front.id(), self.layout.edge(facing))?;
        scene.set_local_position(self.back.id(), self.layout.edge(facing.flipped()))?;
        self.front.set_enabled(scene, true)?;
        self.back.set_enabled(scene, false)?;

        log::debug!("Edge checker {} now facing {:?}", self.front.id(), facing);
        Ok(true)
    }

    fn set_destroyer_facing<S: SceneGraph>(&mut self, scene: &mut S, facing: Facing) -> Result<bool> {
        if self.destroyer_facing == Some(facing) {
            return Ok(false);
        }
        self.destroyer_facing = Some(facing);

        // The trailing side is armed
        let (armed, disarmed) = match facing {
            Facing::Right => (self.left_destroyer, self.right_destroyer),
            Facing::Left => (self.right_destroyer, self.left_destroyer),
        };
        disarmed.set_enabled(scene, false)?;
        armed.set_enabled(scene, true)?;

        log::debug!("Destroyer {} armed, {} disarmed", armed.id(), disarmed.id());
        Ok(true)
    }

    fn set_middle_checkers_enabled<S: SceneGraph>(&self, scene: &mut S, enabled: bool) -> Result<()> {
        for checker in &self.middle {
            checker.set_enabled(scene, enabled)?;
        }
        Ok(())
    }

    /// Build an empty wrapper with its marker sized to one chunk, holding
    /// a fresh content instance
    fn wrap_chunk<S: Stage>(&self, scene: &mut S) -> Result<Id> {
        let wrapper = scene.instantiate(PrefabKind::ChunkWrapper, Vec2::ZERO)?;
        match scene.find_collider_in_children(wrapper) {
            Some(marker) => {
                if let Some(mut collider) = scene.collider(marker).copied() {
                    collider.size = Vec2::new(self.config.chunk_width, self.config.marker_height);
                    collider.offset = Vec2::new(0.0, self.config.marker_y);
                    scene.set_collider(marker, Some(collider))?;
                }
            }
            None => log::warn!("Chunk wrapper {} has no marker collider", wrapper),
        }

        let content = scene.instantiate(PrefabKind::ChunkContent, Vec2::ZERO)?;
        scene.reparent(content, Some(wrapper), false)?;
        scene.set_local_position(content, Vec2::ZERO)?;
        Ok(wrapper)
    }

    fn load_chunk_at_index<S: Stage>(&self, scene: &mut S, index: i32) -> Result<Id> {
        let wrapper = self.wrap_chunk(scene)?;
        let x = self.config.chunk_center(index);
        scene.set_local_position(wrapper, Vec2::new(x, 0.0))?;
        scene.reparent(wrapper, Some(self.repository), true)?;
        scene.set_name(wrapper, &format!("ChunkWrapper {}", index))?;

        log::debug!("Loaded chunk {} as {} at x = {}", index, wrapper, x);
        Ok(wrapper)
    }

    fn on_chunk_missing<S: Stage>(&self, scene: &mut S, event: &ChunkMissing) -> Result<()> {
        let index = self.config.chunk_index(event.position.x);
        self.load_chunk_at_index(scene, index)?;

        if self.is_edge(event.checker) {
            return Ok(());
        }
        if let Some(checker) = self.middle.iter().find(|c| c.id() == event.checker) {
            log::debug!("Retiring middle checker {}", checker.id());
            checker.set_enabled(scene, false)?;
        }
        Ok(())
    }

    fn loaded_chunks<S: SceneGraph>(&self, scene: &S) -> Vec<i32> {
        let mut indices: Vec<i32> = scene
            .children(self.repository)
            .iter()
            .filter(|&&id| scene.tag(id) == Some(CHUNK_WRAPPER_TAG))
            .filter_map(|&id| scene.world_position(id))
            .map(|position| self.config.chunk_index(position.x))
            .collect();
        indices.sort_unstable();
        indices
    }
}

#[derive(Debug, Clone, Copy)]
struct Listeners {
    missing: ListenerId,
    destroying: ListenerId,
    facing: ListenerId,
}

/// Keeps chunks loaded around its host node as the host travels
pub struct ChunkStreamer<S> {
    node: Id,
    config: StreamingConfig,
    scene: Shared<S>,
    state: Shared<StreamerState>,
    listeners: Listeners,
}

impl<S: Stage + Send + 'static> ChunkStreamer<S> {
    /// Initialize the coordinator on `node`.
    ///
    /// In order: verify `node` is parented to the configured host, find or
    /// create the chunk repository, lay out and create the checkers, create
    /// the destroyers, apply the initial facing, then subscribe. Checkers
    /// and destroyers left by an earlier attach on the same node are
    /// removed, as are all existing [`ChunkMissing`] and
    /// [`ChunkDestroying`] listeners, so only one coordinator is live. The
    /// replaced coordinator's [`FacingChanged`] listener stays registered
    /// but ignores further events.
    pub fn attach(
        bus: &mut EventBus,
        scene: Shared<S>,
        node: Id,
        config: StreamingConfig,
    ) -> Result<Self> {
        config.validate()?;

        let state = {
            let mut guard = scene.lock();
            let stage = &mut *guard;

            let host = check_host(stage, node, &config)?;
            stage.set_local_position(node, Vec2::ZERO)?;
            let repository = init_repository(stage, &config.repository_name)?;
            remove_previous(stage, node);

            let layout = StreamingLayout::compute(&config);
            let extent = config.checker_extent;

            let checkers_parent = stage.spawn(CHECKERS_NAME, Some(node), Vec2::ZERO)?;
            let middle = layout
                .middle
                .iter()
                .map(|&position| Checker::create(stage, checkers_parent, position, extent))
                .collect::<Result<Vec<_>>>()?;
            let front = Checker::create(stage, checkers_parent, layout.right_edge, extent)?;
            let back = Checker::create(stage, checkers_parent, layout.left_edge, extent)?;

            let destroyers_parent = stage.spawn(DESTROYERS_NAME, Some(node), Vec2::ZERO)?;
            let left_destroyer = Destroyer::create(stage, destroyers_parent, layout.left_destroyer)?;
            let right_destroyer = Destroyer::create(stage, destroyers_parent, layout.right_destroyer)?;

            let mut state = StreamerState {
                config: config.clone(),
                layout,
                host,
                repository,
                checkers_parent,
                destroyers_parent,
                middle,
                front,
                back,
                left_destroyer,
                right_destroyer,
                checker_facing: None,
                destroyer_facing: None,
            };
            state.apply_facing(stage, config.initial_facing)?;
            state
        };

        log::info!(
            "Chunk streaming attached to {}: {} checkers, destroyers at ±{}",
            node,
            state.layout.checker_count(),
            state.layout.right_destroyer.x
        );

        let state = shared(state);
        bus.clear_listeners::<ChunkMissing>();
        bus.clear_listeners::<ChunkDestroying>();
        let listeners = subscribe(bus, &state, &scene);

        Ok(Self {
            node,
            config,
            scene,
            state,
            listeners,
        })
    }

    /// Unsubscribe and remove the checkers and destroyers.
    /// Loaded chunks stay in the repository.
    pub fn detach(self, bus: &mut EventBus) {
        bus.remove_listener::<ChunkMissing>(self.listeners.missing);
        bus.remove_listener::<ChunkDestroying>(self.listeners.destroying);
        bus.remove_listener::<FacingChanged>(self.listeners.facing);

        let state = self.state.lock();
        let mut scene = self.scene.lock();
        scene.destroy(state.checkers_parent);
        scene.destroy(state.destroyers_parent);
        log::info!("Chunk streaming detached from {}", self.node);
    }

    /// Probe with every enabled checker, publishing a [`ChunkMissing`] per
    /// gap. Returns the number of gaps reported.
    pub fn tick(&self, bus: &mut EventBus) -> usize {
        let checkers = self.state.lock().checkers();
        checkers
            .iter()
            .filter(|checker| checker.update(bus, &self.scene))
            .count()
    }

    /// Route sensor contacts to the destroyers, publishing a
    /// [`ChunkDestroying`] per chunk wrapper entering an armed destroyer.
    /// Returns the number of events published.
    pub fn handle_contacts(&self, bus: &mut EventBus, contacts: &[Contact]) -> usize {
        let (left, right) = {
            let state = self.state.lock();
            (state.left_destroyer, state.right_destroyer)
        };

        let mut published = 0;
        for contact in contacts.iter().filter(|c| c.is_enter()) {
            let destroyer = if contact.sensor == left.id() {
                left
            } else if contact.sensor == right.id() {
                right
            } else {
                continue;
            };

            if destroyer.trigger_destroy(bus, &self.scene, contact.other) {
                published += 1;
            }
        }
        published
    }

    /// Apply a facing directly, as a [`FacingChanged`] would
    pub fn set_facing(&self, facing: Facing) -> Result<()> {
        let mut state = self.state.lock();
        let mut scene = self.scene.lock();
        state.apply_facing(&mut *scene, facing)
    }

    /// Load the chunk containing `position`
    pub fn ensure_chunk_around(&self, position: Vec2) -> Result<Id> {
        self.load_chunk_at_index(self.chunk_index(position))
    }

    /// Instantiate, wrap and position the chunk `index` under the repository
    pub fn load_chunk_at_index(&self, index: i32) -> Result<Id> {
        let state = self.state.lock();
        let mut scene = self.scene.lock();
        state.load_chunk_at_index(&mut *scene, index)
    }

    /// Remove a chunk wrapper. Unknown ids are ignored.
    pub fn destroy_chunk(&self, chunk: Id) {
        destroy_chunk(&mut *self.scene.lock(), chunk);
    }

    /// Not supported: chunks are only unloaded by destroyers
    pub fn unload_chunk_at_index(&self, index: i32) {
        log::warn!("unload_chunk_at_index({}): not implemented, ignoring", index);
    }

    /// Re-arm (or retire) every middle checker at once
    pub fn set_middle_checkers_enabled(&self, enabled: bool) -> Result<()> {
        let state = self.state.lock();
        let mut scene = self.scene.lock();
        state.set_middle_checkers_enabled(&mut *scene, enabled)
    }

    /// Indices of the chunk wrappers currently in the repository, ascending
    pub fn loaded_chunks(&self) -> Vec<i32> {
        let state = self.state.lock();
        let scene = self.scene.lock();
        state.loaded_chunks(&*scene)
    }

    pub fn chunk_index(&self, position: Vec2) -> i32 {
        self.config.chunk_index(position.x)
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn node(&self) -> Id {
        self.node
    }

    pub fn host(&self) -> Id {
        self.state.lock().host
    }

    pub fn repository(&self) -> Id {
        self.state.lock().repository
    }

    pub fn checker_facing(&self) -> Option<Facing> {
        self.state.lock().checker_facing
    }

    pub fn destroyer_facing(&self) -> Option<Facing> {
        self.state.lock().destroyer_facing
    }

    pub fn middle_checkers(&self) -> Vec<Id> {
        self.state.lock().middle.iter().map(Checker::id).collect()
    }

    /// `(front, back)` edge checkers
    pub fn edge_checkers(&self) -> (Id, Id) {
        let state = self.state.lock();
        (state.front.id(), state.back.id())
    }

    /// Every checker, middle ones first
    pub fn checkers(&self) -> Vec<Id> {
        self.state.lock().checkers().iter().map(Checker::id).collect()
    }

    /// `(left, right)` destroyers
    pub fn destroyers(&self) -> (Id, Id) {
        let state = self.state.lock();
        (state.left_destroyer.id(), state.right_destroyer.id())
    }

    pub fn layout(&self) -> StreamingLayout {
        self.state.lock().layout.clone()
    }
}

fn subscribe<S: Stage + Send + 'static>(
    bus: &mut EventBus,
    state: &Shared<StreamerState>,
    scene: &Shared<S>,
) -> Listeners {
    let missing = {
        let state = Arc::clone(state);
        let scene = Arc::clone(scene);
        bus.add_listener(move |event: &mut ChunkMissing| {
            let state = state.lock();
            let mut scene = scene.lock();
            if let Err(err) = state.on_chunk_missing(&mut *scene, event) {
                log::error!("Failed to load chunk at {:?}: {}", event.position, err);
            }
        })
    };

    let destroying = {
        let scene = Arc::clone(scene);
        bus.add_listener(move |event: &mut ChunkDestroying| {
            destroy_chunk(&mut *scene.lock(), event.chunk);
        })
    };

    let facing = {
        let state = Arc::clone(state);
        let scene = Arc::clone(scene);
        bus.add_listener(move |event: &mut FacingChanged| {
            let mut state = state.lock();
            let mut scene = scene.lock();
            if !state.is_attached(&*scene) {
                return;
            }
            if let Err(err) = state.apply_facing(&mut *scene, event.facing()) {
                log::error!("Failed to apply facing {:?}: {}", event.facing(), err);
            }
        })
    };

    Listeners {
        missing,
        destroying,
        facing,
    }
}

fn destroy_chunk<S: Stage>(scene: &mut S, chunk: Id) {
    if scene.contains(chunk) {
        log::debug!("Destroying chunk {:?} ({})", scene.name(chunk), chunk);
        scene.destroy(chunk);
    }
}

/// The host is the coordinator's parent and must carry the configured name
fn check_host<S: SceneGraph>(scene: &S, node: Id, config: &StreamingConfig) -> Result<Id> {
    if !scene.contains(node) {
        return Err(SceneError::NodeNotFound(node).into());
    }
    let parent = scene.parent(node);
    match parent {
        Some(host) if scene.name(host) == Some(config.host_name.as_str()) => Ok(host),
        _ => {
            let found = parent.and_then(|p| scene.name(p)).map(str::to_string);
            log::error!(
                "Chunk streaming on {} must be parented to {}, found {:?}",
                node,
                config.host_name,
                found
            );
            Err(StreamingError::MissingHost {
                expected: config.host_name.clone(),
                found,
            })
        }
    }
}

/// Reuse the root-level repository if one exists, resetting its position
fn init_repository<S: SceneGraph>(scene: &mut S, name: &str) -> Result<Id> {
    match scene.find_root(name) {
        Some(repository) => {
            scene.set_local_position(repository, Vec2::ZERO)?;
            log::debug!("Reusing chunk repository {}", repository);
            Ok(repository)
        }
        None => Ok(scene.spawn(name, None, Vec2::ZERO)?),
    }
}

fn remove_previous<S: Stage>(scene: &mut S, node: Id) {
    let stale: Vec<Id> = scene
        .children(node)
        .iter()
        .copied()
        .filter(|&child| matches!(scene.name(child), Some(CHECKERS_NAME) | Some(DESTROYERS_NAME)))
        .collect();
    for child in stale {
        log::debug!("Removing {:?} left by a previous attach", scene.name(child));
        scene.destroy(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_scene::{PrefabLibrary, Scene};

    fn hosted_scene() -> (Shared<Scene>, Id) {
        let mut scene = Scene::new(PrefabLibrary::standard(16.0));
        let host = scene.spawn("SceneBox", None, Vec2::ZERO).unwrap();
        let node = scene.spawn("ChunkLoader", Some(host), Vec2::new(3.0, 3.0)).unwrap();
        (shared(scene), node)
    }

    #[test]
    fn test_attach_resets_node_and_creates_repository() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();

        let scene = scene.lock();
        assert_eq!(scene.local_position(node), Some(Vec2::ZERO));
        assert_eq!(scene.find_root("ChunkRepository"), Some(streamer.repository()));
        assert_eq!(streamer.host(), scene.parent(node).unwrap());
    }

    #[test]
    fn test_attach_requires_host() {
        let mut raw = Scene::new(PrefabLibrary::standard(16.0));
        let wrong = raw.spawn("World", None, Vec2::ZERO).unwrap();
        let node = raw.spawn("ChunkLoader", Some(wrong), Vec2::ZERO).unwrap();
        let orphan = raw.spawn("Orphan", None, Vec2::ZERO).unwrap();
        let scene = shared(raw);
        let mut bus = EventBus::new();

        let err = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            StreamingError::MissingHost { ref found, .. } if found.as_deref() == Some("World")
        ));

        let err = ChunkStreamer::attach(&mut bus, scene, orphan, StreamingConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, StreamingError::MissingHost { found: None, .. }));
        assert!(!bus.has_listener::<ChunkMissing>());
    }

    #[test]
    fn test_attach_rejects_invalid_config() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let config = StreamingConfig {
            minimum_chunks: 0,
            ..StreamingConfig::default()
        };
        assert!(matches!(
            ChunkStreamer::attach(&mut bus, scene, node, config),
            Err(StreamingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_existing_repository_is_reused_and_reset() {
        let (scene, node) = hosted_scene();
        let existing = scene
            .lock()
            .spawn("ChunkRepository", None, Vec2::new(5.0, 5.0))
            .unwrap();
        let mut bus = EventBus::new();
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();

        assert_eq!(streamer.repository(), existing);
        assert_eq!(scene.lock().local_position(existing), Some(Vec2::ZERO));
    }

    #[test]
    fn test_loaded_chunk_is_wrapped_and_named() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();

        let wrapper = streamer.load_chunk_at_index(-2).unwrap();
        let scene = scene.lock();
        assert_eq!(scene.name(wrapper), Some("ChunkWrapper -2"));
        assert_eq!(scene.parent(wrapper), Some(streamer.repository()));
        assert_eq!(scene.world_position(wrapper), Some(Vec2::new(-24.0, 0.0)));

        let marker = scene.find_collider_in_children(wrapper).unwrap();
        let collider = scene.collider(marker).unwrap();
        assert_eq!(collider.size, Vec2::new(16.0, 0.5));
        assert_eq!(collider.offset, Vec2::new(0.0, -10.0));
        assert_eq!(scene.children(wrapper).len(), 2);
    }

    #[test]
    fn test_unload_by_index_is_a_noop() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let streamer = ChunkStreamer::attach(&mut bus, scene, node, StreamingConfig::default()).unwrap();
        streamer.load_chunk_at_index(0).unwrap();

        streamer.unload_chunk_at_index(0);
        assert_eq!(streamer.loaded_chunks(), vec![0]);
    }

    #[test]
    fn test_detach_removes_nodes_and_listeners() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();
        let checkers = streamer.checkers();

        streamer.detach(&mut bus);
        assert!(!bus.has_listener::<ChunkMissing>());
        assert!(!bus.has_listener::<ChunkDestroying>());
        assert!(!bus.has_listener::<FacingChanged>());
        assert!(checkers.iter().all(|&id| !scene.lock().contains(id)));
        assert!(scene.lock().children(node).is_empty());
    }

    #[test]
    fn test_replaced_coordinator_ignores_facing() {
        let (scene, node) = hosted_scene();
        let mut bus = EventBus::new();
        let first = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();
        let second = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, StreamingConfig::default()).unwrap();

        assert!(!first.state.lock().is_attached(&*scene.lock()));
        assert!(second.state.lock().is_attached(&*scene.lock()));

        let player = scene.lock().spawn("Player", None, Vec2::ZERO).unwrap();
        bus.raise(&mut FacingChanged::new(player, Facing::Left));

        assert_eq!(first.checker_facing(), Some(Facing::Right));
        assert_eq!(second.checker_facing(), Some(Facing::Left));
        assert_eq!(second.destroyer_facing(), Some(Facing::Left));
    }
}
