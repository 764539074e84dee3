//! In-memory scene graph

use crate::collider::Collider;
use crate::contact::{Contact, ContactTracker};
use crate::error::{Result, SceneError};
use crate::prefab::{Prefab, PrefabKind, PrefabLibrary};
use crate::traits::{ContentFactory, SceneGraph, WorldProbe};
use std::collections::{HashMap, HashSet};
use strider_core::{Id, IdGenerator};
use strider_math::{aabb_overlap, segment_hits_aabb, Aabb2, Vec2};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    tag: Option<String>,
    parent: Option<Id>,
    children: Vec<Id>,
    local_position: Vec2,
    active: bool,
    collider: Option<Collider>,
}

impl Node {
    fn new(name: &str, parent: Option<Id>, local_position: Vec2) -> Self {
        Self {
            name: name.to_string(),
            tag: None,
            parent,
            children: Vec::new(),
            local_position,
            active: true,
            collider: None,
        }
    }
}

/// Node arena with parent/child links, box colliders and prefabs
#[derive(Debug)]
pub struct Scene {
    ids: IdGenerator,
    nodes: HashMap<Id, Node>,
    roots: Vec<Id>,
    prefabs: PrefabLibrary,
    contacts: ContactTracker,
}

impl Scene {
    /// Create a scene with the given templates
    pub fn new(prefabs: PrefabLibrary) -> Self {
        Self {
            ids: IdGenerator::new(),
            nodes: HashMap::new(),
            roots: Vec::new(),
            prefabs,
            contacts: ContactTracker::new(),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    /// Sensor/solid overlaps that started or ended since the last call
    pub fn collect_contacts(&mut self) -> Vec<Contact> {
        let mut sensors = Vec::new();
        let mut solids = Vec::new();
        for (&id, node) in &self.nodes {
            let Some(bounds) = self.live_bounds(id, node) else {
                continue;
            };
            if node.collider.map_or(false, |c| c.is_sensor()) {
                sensors.push((id, bounds));
            } else {
                solids.push((id, bounds));
            }
        }

        let mut current = HashSet::new();
        for (sensor, sensor_bounds) in &sensors {
            for (other, other_bounds) in &solids {
                if aabb_overlap(sensor_bounds, other_bounds) {
                    current.insert((*sensor, *other));
                }
            }
        }

        let contacts = self.contacts.update(current);
        for contact in &contacts {
            log::trace!("{:?} {} <-> {}", contact.kind, contact.sensor, contact.other);
        }
        contacts
    }

    /// World bounds of an enabled collider on a node active in the hierarchy
    fn live_bounds(&self, id: Id, node: &Node) -> Option<Aabb2> {
        let collider = node.collider.filter(|c| c.enabled)?;
        if !self.is_active_in_hierarchy(id) {
            return None;
        }
        Some(collider.bounds_at(self.world_position(id)?))
    }

    fn node(&self, id: Id) -> Result<&Node> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: Id) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn attach(&mut self, id: Id, parent: Option<Id>) {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
    }

    fn detach(&mut self, id: Id, parent: Option<Id>) {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
    }

    fn build(&mut self, prefab: &Prefab, parent: Option<Id>, local_position: Vec2) -> Result<Id> {
        let id = self.spawn(&prefab.name, parent, local_position)?;
        {
            let node = self.node_mut(id)?;
            node.tag = prefab.tag.clone();
            node.collider = prefab.collider;
        }
        for child in &prefab.children {
            self.build(child, Some(id), child.local_position)?;
        }
        Ok(id)
    }

    fn subtree(&self, id: Id) -> Vec<Id> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(PrefabLibrary::new())
    }
}

impl WorldProbe for Scene {
    fn line_probe(&self, a: Vec2, b: Vec2) -> usize {
        self.nodes
            .iter()
            .filter(|(_, node)| node.collider.map_or(false, |c| !c.is_sensor()))
            .filter_map(|(&id, node)| self.live_bounds(id, node))
            .filter(|bounds| segment_hits_aabb(a, b, bounds))
            .count()
    }
}

impl ContentFactory for Scene {
    fn instantiate(&mut self, kind: PrefabKind, position: Vec2) -> Result<Id> {
        let prefab = self
            .prefabs
            .get(kind)
            .cloned()
            .ok_or(SceneError::PrefabNotFound(kind))?;
        let id = self.build(&prefab, None, position)?;
        log::trace!("Instantiated {:?} as {}", kind, id);
        Ok(id)
    }

    fn destroy(&mut self, id: Id) {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return;
        };
        self.detach(id, parent);
        for node in self.subtree(id) {
            self.nodes.remove(&node);
            self.ids.release(node);
        }
        log::trace!("Destroyed {}", id);
    }

    fn reparent(&mut self, id: Id, parent: Option<Id>, keep_world_position: bool) -> Result<()> {
        let old_parent = self.node(id)?.parent;
        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            let mut cursor = Some(new_parent);
            while let Some(ancestor) = cursor {
                if ancestor == id {
                    return Err(SceneError::CyclicParent { child: id, parent: new_parent });
                }
                cursor = self.parent(ancestor);
            }
        }

        let world = self.world_position(id).unwrap_or_default();
        let parent_world = parent
            .and_then(|p| self.world_position(p))
            .unwrap_or_default();

        self.detach(id, old_parent);
        self.attach(id, parent);
        let node = self.node_mut(id)?;
        node.parent = parent;
        if keep_world_position {
            node.local_position = world - parent_world;
        }
        Ok(())
    }
}

impl SceneGraph for Scene {
    fn spawn(&mut self, name: &str, parent: Option<Id>, local_position: Vec2) -> Result<Id> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let id = self.ids.allocate();
        self.nodes.insert(id, Node::new(name, parent, local_position));
        self.attach(id, parent);
        Ok(id)
    }

    fn find_root(&self, name: &str) -> Option<Id> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.name(*id) == Some(name))
    }

    fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    fn name(&self, id: Id) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name.as_str())
    }

    fn set_name(&mut self, id: Id, name: &str) -> Result<()> {
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    fn tag(&self, id: Id) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.tag.as_deref())
    }

    fn set_tag(&mut self, id: Id, tag: Option<&str>) -> Result<()> {
        self.node_mut(id)?.tag = tag.map(str::to_string);
        Ok(())
    }

    fn parent(&self, id: Id) -> Option<Id> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn children(&self, id: Id) -> &[Id] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn local_position(&self, id: Id) -> Option<Vec2> {
        self.nodes.get(&id).map(|n| n.local_position)
    }

    fn set_local_position(&mut self, id: Id, position: Vec2) -> Result<()> {
        self.node_mut(id)?.local_position = position;
        Ok(())
    }

    fn world_position(&self, id: Id) -> Option<Vec2> {
        let mut node = self.nodes.get(&id)?;
        let mut position = node.local_position;
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            position += node.local_position;
        }
        Some(position)
    }

    fn set_active(&mut self, id: Id, active: bool) -> Result<()> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    fn is_active(&self, id: Id) -> bool {
        self.nodes.get(&id).map_or(false, |n| n.active)
    }

    fn is_active_in_hierarchy(&self, id: Id) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(&current) {
                Some(node) if node.active => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    fn collider(&self, id: Id) -> Option<&Collider> {
        self.nodes.get(&id).and_then(|n| n.collider.as_ref())
    }

    fn set_collider(&mut self, id: Id, collider: Option<Collider>) -> Result<()> {
        self.node_mut(id)?.collider = collider;
        Ok(())
    }

    fn set_collider_enabled(&mut self, id: Id, enabled: bool) -> Result<()> {
        if let Some(collider) = self.node_mut(id)?.collider.as_mut() {
            collider.enabled = enabled;
        }
        Ok(())
    }

    fn find_collider_in_children(&self, id: Id) -> Option<Id> {
        let mut stack: Vec<Id> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.collider(current).is_some() {
                return Some(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        None
    }
}
