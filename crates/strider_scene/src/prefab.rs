//! Prefab templates instantiated by the content factory

use crate::collider::Collider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strider_math::Vec2;

/// Tag carried by the root node of every chunk wrapper
pub const CHUNK_WRAPPER_TAG: &str = "ChunkWrapper";

/// Name of the boundary marker child of a chunk wrapper
pub const MARKER_NAME: &str = "Marker";

/// What the factory can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefabKind {
    Checker,
    Destroyer,
    ChunkWrapper,
    ChunkContent,
}

/// A node template, instantiated recursively
#[derive(Debug, Clone)]
pub struct Prefab {
    pub name: String,
    pub tag: Option<String>,
    pub local_position: Vec2,
    pub collider: Option<Collider>,
    pub children: Vec<Prefab>,
}

impl Prefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            local_position: Vec2::ZERO,
            collider: None,
            children: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_child(mut self, child: Prefab) -> Self {
        self.children.push(child);
        self
    }
}

/// Templates by kind
#[derive(Debug, Clone, Default)]
pub struct PrefabLibrary {
    templates: HashMap<PrefabKind, Prefab>,
}

impl PrefabLibrary {
    /// An empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock templates for chunks of the given width.
    ///
    /// - checker: bare node, probes only
    /// - destroyer: small sensor box
    /// - chunk wrapper: tagged root with a solid `Marker` child, resized by
    ///   the streaming coordinator
    /// - chunk content: a one-unit-thick floor spanning the chunk
    pub fn standard(chunk_width: f32) -> Self {
        let mut library = Self::new();
        library.register(PrefabKind::Checker, Prefab::new("Checker"));
        library.register(
            PrefabKind::Destroyer,
            Prefab::new("Destroyer").with_collider(Collider::sensor(Vec2::new(0.5, 1.0))),
        );
        library.register(
            PrefabKind::ChunkWrapper,
            Prefab::new("ChunkWrapper")
                .with_tag(CHUNK_WRAPPER_TAG)
                .with_child(Prefab::new(MARKER_NAME).with_collider(Collider::solid(Vec2::ONE))),
        );
        library.register(
            PrefabKind::ChunkContent,
            Prefab::new("ChunkContent")
                .with_child(Prefab::new("Floor").with_collider(Collider::solid(Vec2::new(chunk_width, 1.0)))),
        );
        library
    }

    /// Register or replace the template for `kind`
    pub fn register(&mut self, kind: PrefabKind, prefab: Prefab) {
        self.templates.insert(kind, prefab);
    }

    pub fn get(&self, kind: PrefabKind) -> Option<&Prefab> {
        self.templates.get(&kind)
    }
}
