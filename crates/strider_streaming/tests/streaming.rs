//! End-to-end streaming behavior on the in-memory scene

use approx::assert_relative_eq;
use parking_lot::Mutex;
use std::sync::Arc;
use strider_character::{follow_player, Facing, FacingChanged, MovementController};
use strider_core::{shared, Id, Shared};
use strider_event::EventBus;
use strider_math::Vec2;
use strider_scene::{Collider, Contact, PrefabLibrary, Scene, SceneGraph};
use strider_streaming::prelude::*;

struct World {
    bus: EventBus,
    scene: Shared<Scene>,
    streamer: ChunkStreamer<Scene>,
    controller: MovementController,
    host: Id,
}

impl World {
    fn new(config: StreamingConfig) -> Self {
        let mut scene = Scene::new(PrefabLibrary::standard(config.chunk_width));
        let player = scene.spawn("Player", None, Vec2::ZERO).unwrap();
        let host = scene.spawn("SceneBox", None, Vec2::ZERO).unwrap();
        let node = scene.spawn("ChunkLoader", Some(host), Vec2::ZERO).unwrap();
        let scene = shared(scene);

        let mut bus = EventBus::new();
        follow_player(&mut bus, Arc::clone(&scene), host);
        let controller = MovementController::new(player, config.initial_facing);
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, config).unwrap();

        Self {
            bus,
            scene,
            streamer,
            controller,
            host,
        }
    }

    /// One frame: movement, queue, probes, contacts
    fn frame(&mut self, dx: f32) {
        self.controller.step(&mut self.bus, &self.scene, dx).unwrap();
        self.bus.process_queue();
        self.streamer.tick(&mut self.bus);
        let contacts = self.scene.lock().collect_contacts();
        self.streamer.handle_contacts(&mut self.bus, &contacts);
    }

    fn host_x(&self) -> f32 {
        self.scene.lock().world_position(self.host).unwrap().x
    }

    fn local(&self, id: Id) -> Vec2 {
        self.scene.lock().local_position(id).unwrap()
    }

    fn active(&self, id: Id) -> bool {
        self.scene.lock().is_active(id)
    }
}

#[test]
fn default_layout_has_four_checkers_and_two_destroyers() {
    let world = World::new(StreamingConfig::default());

    assert_eq!(world.streamer.checkers().len(), 4);
    assert_eq!(world.streamer.middle_checkers().len(), 2);

    let (front, back) = world.streamer.edge_checkers();
    assert_relative_eq!(world.local(front).x, 24.0);
    assert_relative_eq!(world.local(back).x, -24.0);
    assert!(world.active(front));
    assert!(!world.active(back));

    let (left, right) = world.streamer.destroyers();
    assert_relative_eq!(world.local(left).x, -40.0);
    assert_relative_eq!(world.local(right).x, 40.0);
    assert!(world.active(left));
    assert!(!world.active(right));

    assert_eq!(world.streamer.checker_facing(), Some(Facing::Right));
    assert_eq!(world.streamer.destroyer_facing(), Some(Facing::Right));
}

#[test]
fn initial_left_facing_swaps_the_slots() {
    let world = World::new(StreamingConfig {
        initial_facing: Facing::Left,
        ..StreamingConfig::default()
    });

    let (front, back) = world.streamer.edge_checkers();
    assert_relative_eq!(world.local(front).x, -24.0);
    assert_relative_eq!(world.local(back).x, 24.0);
    let (left, right) = world.streamer.destroyers();
    assert!(!world.active(left));
    assert!(world.active(right));
}

#[test]
fn gaps_are_reported_at_the_lower_probe_point() {
    let mut world = World::new(StreamingConfig::default());
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    world
        .bus
        .add_listener(move |e: &mut ChunkMissing| sink.lock().push(e.position));

    assert_eq!(world.streamer.tick(&mut world.bus), 3);
    assert_eq!(
        *reports.lock(),
        vec![
            Vec2::new(-8.0, -10.5),
            Vec2::new(8.0, -10.5),
            Vec2::new(24.0, -10.5)
        ]
    );
    assert_eq!(world.streamer.loaded_chunks(), vec![-1, 0, 1]);

    // Everything in reach is loaded now
    assert_eq!(world.streamer.tick(&mut world.bus), 0);
}

#[test]
fn middle_checkers_retire_but_edges_stay_armed() {
    let mut world = World::new(StreamingConfig::default());
    world.streamer.tick(&mut world.bus);

    for checker in world.streamer.middle_checkers() {
        assert!(!world.active(checker));
    }
    let (front, _) = world.streamer.edge_checkers();
    assert!(world.active(front));

    world.streamer.set_middle_checkers_enabled(true).unwrap();
    for checker in world.streamer.middle_checkers() {
        assert!(world.active(checker));
    }
    // Re-armed checkers sit over loaded chunks and stay quiet
    assert_eq!(world.streamer.tick(&mut world.bus), 0);
    assert_eq!(world.streamer.loaded_chunks(), vec![-1, 0, 1]);
}

#[test]
fn facing_round_trip_restores_edge_and_inverts_destroyers() {
    let mut world = World::new(StreamingConfig::default());
    let (front, back) = world.streamer.edge_checkers();
    let (left, right) = world.streamer.destroyers();
    let original = world.local(front);
    let player = world.controller.player();

    world
        .bus
        .raise(&mut FacingChanged::new(player, Facing::Left));
    assert_relative_eq!(world.local(front).x, -24.0);
    assert_relative_eq!(world.local(back).x, 24.0);
    assert!(!world.active(left));
    assert!(world.active(right));

    // Repeating the same facing changes nothing
    world
        .bus
        .raise(&mut FacingChanged::new(player, Facing::Left));
    assert!(!world.active(left));
    assert!(world.active(right));

    world
        .bus
        .raise(&mut FacingChanged::new(player, Facing::Right));
    assert_eq!(world.local(front), original);
    assert!(world.active(left));
    assert!(!world.active(right));
    assert_relative_eq!(world.local(left).x, -40.0);
    assert_relative_eq!(world.local(right).x, 40.0);
}

#[test]
fn traversal_keeps_a_bounded_window_without_thrash() {
    let mut world = World::new(StreamingConfig::default());
    world.bus.process_queue();
    world.streamer.tick(&mut world.bus);

    let loads = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&loads);
    // Registered after the coordinator, so it observes the same reports
    world.bus.add_listener(move |_: &mut ChunkMissing| *sink.lock() += 1);

    for _ in 0..100 {
        world.frame(1.0);
        let loaded = world.streamer.loaded_chunks();
        assert!(loaded.len() <= 5, "window grew to {:?}", loaded);
        // Every armed checker already sees content
        assert_eq!(world.streamer.tick(&mut world.bus), 0);
    }
    assert_relative_eq!(world.host_x(), 100.0);
    assert_eq!(world.streamer.loaded_chunks(), vec![4, 5, 6, 7]);
    assert_eq!(*loads.lock(), 6);

    for _ in 0..20 {
        world.frame(-1.0);
        let loaded = world.streamer.loaded_chunks();
        assert!(loaded.len() <= 5, "window grew to {:?}", loaded);
    }
    assert_eq!(world.controller.facing(), Facing::Left);
    assert_relative_eq!(world.host_x(), 80.0);
    assert_eq!(world.streamer.loaded_chunks(), vec![3, 4, 5, 6]);
}

#[test]
fn contacts_outside_chunks_are_ignored() {
    let mut world = World::new(StreamingConfig::default());
    let (left, _) = world.streamer.destroyers();
    let loose = {
        let mut scene = world.scene.lock();
        let loose = scene.spawn("Rock", None, Vec2::new(-40.0, -10.0)).unwrap();
        scene.set_collider(loose, Some(Collider::solid(Vec2::ONE))).unwrap();
        loose
    };

    let contacts = world.scene.lock().collect_contacts();
    assert_eq!(contacts, vec![Contact::enter(left, loose)]);
    assert_eq!(world.streamer.handle_contacts(&mut world.bus, &contacts), 0);
    assert!(world.scene.lock().contains(loose));
}

#[test]
fn disarmed_destroyer_ignores_chunks() {
    let mut world = World::new(StreamingConfig::default());
    let (_, right) = world.streamer.destroyers();
    let chunk = world.streamer.load_chunk_at_index(2).unwrap();
    let marker = world.scene.lock().find_collider_in_children(chunk).unwrap();

    // The right destroyer is disarmed while facing right
    let contacts = [Contact::enter(right, marker)];
    assert_eq!(world.streamer.handle_contacts(&mut world.bus, &contacts), 0);
    assert_eq!(world.streamer.loaded_chunks(), vec![2]);
}

#[test]
fn reattach_replaces_the_previous_coordinator() {
    let mut world = World::new(StreamingConfig::default());
    let old_checkers = world.streamer.checkers();
    let node = world.streamer.node();

    let second = ChunkStreamer::attach(
        &mut world.bus,
        Arc::clone(&world.scene),
        node,
        StreamingConfig::default(),
    )
    .unwrap();

    assert_eq!(world.bus.listener_count::<ChunkMissing>(), 1);
    assert_eq!(world.bus.listener_count::<ChunkDestroying>(), 1);
    {
        let scene = world.scene.lock();
        assert!(old_checkers.iter().all(|&id| !scene.contains(id)));
        assert_eq!(scene.children(node).len(), 2);
    }
    assert_eq!(second.repository(), world.streamer.repository());

    assert_eq!(second.tick(&mut world.bus), 3);
    assert_eq!(second.loaded_chunks(), vec![-1, 0, 1]);
}
