//! The traversal loop
//!
//! Each tick runs, in order: player movement (the host follows through a
//! `PlayerMovementCompleted` listener), the queued-event drain, checker
//! probes, and trigger contacts feeding the destroyers.

use crate::config::{RuntimeConfig, SimulationConfig};
use crate::error::Result;
use std::sync::Arc;
use strider_character::{follow_player, MovementController};
use strider_core::{shared, Id, Shared};
use strider_event::EventBus;
use strider_math::Vec2;
use strider_scene::{PrefabLibrary, Scene, SceneGraph};
use strider_streaming::ChunkStreamer;

/// Name of the streaming coordinator node under the host
pub const LOADER_NAME: &str = "ChunkLoader";

/// Counters collected over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    /// Gaps reported by checkers, one chunk loaded each
    pub gaps: usize,
    pub destroyed: usize,
    /// Largest number of chunks loaded at once
    pub peak_loaded: usize,
}

pub struct App {
    bus: EventBus,
    scene: Shared<Scene>,
    streamer: ChunkStreamer<Scene>,
    controller: MovementController,
    host: Id,
    simulation: SimulationConfig,
    direction: f32,
    stats: RunStats,
}

impl App {
    /// Build the scene (player, host, coordinator) and attach streaming
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let RuntimeConfig {
            bus: bus_config,
            streaming,
            simulation,
            ..
        } = config;

        let mut scene = Scene::new(PrefabLibrary::standard(streaming.chunk_width));
        let player = scene.spawn("Player", None, Vec2::ZERO)?;
        let host = scene.spawn(&streaming.host_name, None, Vec2::ZERO)?;
        let node = scene.spawn(LOADER_NAME, Some(host), Vec2::ZERO)?;
        let scene = shared(scene);

        let mut bus = EventBus::with_config(bus_config);
        follow_player(&mut bus, Arc::clone(&scene), host);

        let facing = streaming.initial_facing;
        let streamer = ChunkStreamer::attach(&mut bus, Arc::clone(&scene), node, streaming)?;

        Ok(Self {
            bus,
            scene,
            streamer,
            controller: MovementController::new(player, facing),
            host,
            simulation,
            direction: facing.sign(),
            stats: RunStats::default(),
        })
    }

    /// Advance one tick
    pub fn tick(&mut self) -> Result<()> {
        let reverse_every = self.simulation.reverse_every;
        if reverse_every > 0 && self.stats.ticks > 0 && self.stats.ticks % reverse_every == 0 {
            self.direction = -self.direction;
            log::info!("Tick {}: reversing at x={:.1}", self.stats.ticks, self.host_x());
        }

        let dx = self.direction * self.simulation.speed;
        self.controller.step(&mut self.bus, &self.scene, dx)?;
        self.bus.process_queue();

        self.stats.gaps += self.streamer.tick(&mut self.bus);
        let contacts = self.scene.lock().collect_contacts();
        self.stats.destroyed += self.streamer.handle_contacts(&mut self.bus, &contacts);

        let loaded = self.streamer.loaded_chunks().len();
        self.stats.peak_loaded = self.stats.peak_loaded.max(loaded);
        self.stats.ticks += 1;
        Ok(())
    }

    /// Run every configured tick, then shut the bus down
    pub fn run(mut self) -> Result<RunStats> {
        log::info!("Running {} ticks", self.simulation.ticks);
        for _ in 0..self.simulation.ticks {
            self.tick()?;
        }

        let stats = self.stats();
        log::info!(
            "Finished at x={:.1} facing {:?}: {} ticks, {} chunks loaded, {} destroyed, peak {} live, window {:?}",
            self.host_x(),
            self.controller().facing(),
            stats.ticks,
            stats.gaps,
            stats.destroyed,
            stats.peak_loaded,
            self.streamer().loaded_chunks()
        );
        self.bus.log_event_table();
        self.bus.shutdown();
        Ok(stats)
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn streamer(&self) -> &ChunkStreamer<Scene> {
        &self.streamer
    }

    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    pub fn host_x(&self) -> f32 {
        self.scene
            .lock()
            .world_position(self.host)
            .map_or(0.0, |p| p.x)
    }
}
