//! Collaborator contracts consumed by the streaming core

use crate::collider::Collider;
use crate::error::Result;
use crate::prefab::PrefabKind;
use strider_core::Id;
use strider_math::Vec2;

/// Physics-side line queries
pub trait WorldProbe {
    /// Number of solid colliders crossed by the segment `a`..`b`.
    /// Disabled, inactive and sensor colliders are not counted.
    fn line_probe(&self, a: Vec2, b: Vec2) -> usize;
}

/// Materializes and removes content
pub trait ContentFactory {
    /// Build a prefab at a world position, at the scene root
    fn instantiate(&mut self, kind: PrefabKind, position: Vec2) -> Result<Id>;

    /// Remove a node and its whole subtree. Unknown ids are ignored.
    fn destroy(&mut self, id: Id);

    /// Move `id` under `parent` (`None` for the root)
    fn reparent(&mut self, id: Id, parent: Option<Id>, keep_world_position: bool) -> Result<()>;
}

/// Hierarchy, transforms and colliders
pub trait SceneGraph {
    /// Create an empty, active node
    fn spawn(&mut self, name: &str, parent: Option<Id>, local_position: Vec2) -> Result<Id>;

    /// First root-level node with this name
    fn find_root(&self, name: &str) -> Option<Id>;

    fn contains(&self, id: Id) -> bool;

    fn name(&self, id: Id) -> Option<&str>;

    fn set_name(&mut self, id: Id, name: &str) -> Result<()>;

    fn tag(&self, id: Id) -> Option<&str>;

    fn set_tag(&mut self, id: Id, tag: Option<&str>) -> Result<()>;

    fn parent(&self, id: Id) -> Option<Id>;

    fn children(&self, id: Id) -> &[Id];

    fn local_position(&self, id: Id) -> Option<Vec2>;

    fn set_local_position(&mut self, id: Id, position: Vec2) -> Result<()>;

    /// Sum of local positions up to the root
    fn world_position(&self, id: Id) -> Option<Vec2>;

    fn set_active(&mut self, id: Id, active: bool) -> Result<()>;

    /// The node's own flag
    fn is_active(&self, id: Id) -> bool;

    /// Active itself and every ancestor active
    fn is_active_in_hierarchy(&self, id: Id) -> bool;

    fn collider(&self, id: Id) -> Option<&Collider>;

    fn set_collider(&mut self, id: Id, collider: Option<Collider>) -> Result<()>;

    /// Toggle an attached collider. No-op for nodes without one.
    fn set_collider_enabled(&mut self, id: Id, enabled: bool) -> Result<()>;

    /// Depth-first search of the subtree below `id` (excluding `id`)
    fn find_collider_in_children(&self, id: Id) -> Option<Id>;
}

/// Everything the streaming core needs from its host scene
pub trait Stage: WorldProbe + ContentFactory + SceneGraph {}

impl<T: WorldProbe + ContentFactory + SceneGraph> Stage for T {}
