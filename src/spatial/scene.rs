//! Scene - registry of physical bodies and their region bounds

use ahash::AHashMap;

use crate::core::error::{CombatError, Result};
use crate::core::types::{EntityId, Position};
use crate::spatial::region::{Region, RegionShape};
use crate::spatial::resolver::SpatialResolver;

#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Free body at a world position
    Root(Position),
    /// Attached to a parent, offset from its position
    Part { parent: EntityId, offset: Position },
}

/// A physical body that sensors can overlap
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    /// Collision layer tested against region masks
    pub category: u8,
    /// Disabled bodies are invisible to sensors (colliders off)
    pub enabled: bool,
    placement: Placement,
}

impl Body {
    pub fn parent(&self) -> Option<EntityId> {
        match self.placement {
            Placement::Root(_) => None,
            Placement::Part { parent, .. } => Some(parent),
        }
    }
}

/// All bodies in the world, in spawn order
#[derive(Default)]
pub struct Scene {
    bodies: AHashMap<EntityId, Body>,
    order: Vec<EntityId>,
    children: AHashMap<EntityId, Vec<EntityId>>,
    regions: AHashMap<(EntityId, Region), RegionShape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_root(&mut self, name: impl Into<String>, position: Position, category: u8) -> EntityId {
        let id = EntityId::new();
        self.insert(id, name.into(), category, Placement::Root(position));
        id
    }

    /// Attach a sub-part (hurtbox, sensor body, ...) to an existing body
    pub fn spawn_part(
        &mut self,
        parent: EntityId,
        name: impl Into<String>,
        offset: Position,
        category: u8,
    ) -> Result<EntityId> {
        if !self.bodies.contains_key(&parent) {
            return Err(CombatError::EntityNotFound(parent));
        }
        let id = EntityId::new();
        self.insert(id, name.into(), category, Placement::Part { parent, offset });
        self.children.entry(parent).or_default().push(id);
        Ok(id)
    }

    fn insert(&mut self, id: EntityId, name: String, category: u8, placement: Placement) {
        self.bodies.insert(
            id,
            Body {
                name,
                category,
                enabled: true,
                placement,
            },
        );
        self.order.push(id);
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }

    pub fn body(&self, entity: EntityId) -> Option<&Body> {
        self.bodies.get(&entity)
    }

    /// Display name, falling back to the handle for stale entities
    pub fn name_of(&self, entity: EntityId) -> String {
        self.bodies
            .get(&entity)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| entity.to_string())
    }

    /// Move a body to a world position
    ///
    /// Parts are re-expressed as an offset so they keep following their parent.
    pub fn set_position(&mut self, entity: EntityId, position: Position) -> Result<()> {
        let placement = self
            .bodies
            .get(&entity)
            .ok_or(CombatError::EntityNotFound(entity))?
            .placement;
        let placement = match placement {
            Placement::Root(_) => Placement::Root(position),
            Placement::Part { parent, .. } => {
                let parent_pos = self
                    .position_of(parent)
                    .ok_or(CombatError::EntityNotFound(parent))?;
                Placement::Part {
                    parent,
                    offset: position - parent_pos,
                }
            }
        };
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.placement = placement;
        }
        Ok(())
    }

    /// Enable or disable every body of a character
    pub fn set_group_enabled(&mut self, root: EntityId, enabled: bool) {
        for member in self.group_members(root) {
            if let Some(body) = self.bodies.get_mut(&member) {
                body.enabled = enabled;
            }
        }
    }

    pub fn is_enabled(&self, entity: EntityId) -> bool {
        self.bodies.get(&entity).map(|b| b.enabled).unwrap_or(false)
    }

    /// Remove a character and everything attached to it
    ///
    /// Handles held elsewhere become stale.
    pub fn destroy(&mut self, root: EntityId) {
        let members = self.group_members(root);
        let parent = self.bodies.get(&root).and_then(|b| b.parent());
        for member in &members {
            self.bodies.remove(member);
            self.children.remove(member);
            for region in Region::ALL {
                self.regions.remove(&(*member, region));
            }
        }
        if let Some(parent) = parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&c| c != root);
            }
        }
        self.order.retain(|id| !members.contains(id));
    }

    pub fn bind_region(&mut self, owner: EntityId, region: Region, shape: RegionShape) {
        self.regions.insert((owner, region), shape);
    }

    pub fn region_shape(&self, owner: EntityId, region: Region) -> Option<RegionShape> {
        self.regions.get(&(owner, region)).copied()
    }

    /// Enabled bodies with resolvable positions, in spawn order
    pub fn enabled_bodies(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.order.iter().filter_map(move |&id| {
            let body = self.bodies.get(&id)?;
            if !body.enabled {
                return None;
            }
            Some((id, self.position_of(id)?))
        })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl SpatialResolver for Scene {
    fn position_of(&self, entity: EntityId) -> Option<Position> {
        let body = self.bodies.get(&entity)?;
        match body.placement {
            Placement::Root(pos) => Some(pos),
            Placement::Part { parent, offset } => Some(self.position_of(parent)? + offset),
        }
    }

    fn group_root(&self, entity: EntityId) -> EntityId {
        let mut current = entity;
        while let Some(parent) = self.bodies.get(&current).and_then(|b| b.parent()) {
            current = parent;
        }
        current
    }

    fn group_members(&self, root: EntityId) -> Vec<EntityId> {
        if !self.bodies.contains_key(&root) {
            return Vec::new();
        }
        let mut members = vec![root];
        let mut i = 0;
        while i < members.len() {
            if let Some(children) = self.children.get(&members[i]) {
                members.extend(children.iter().copied());
            }
            i += 1;
        }
        members
    }

    fn is_within(&self, owner: EntityId, region: Region, entity: EntityId) -> bool {
        let Some(shape) = self.region_shape(owner, region) else {
            return false;
        };
        let Some(body) = self.bodies.get(&entity) else {
            return false;
        };
        if !body.enabled || !shape.mask.contains(body.category) {
            return false;
        }
        match (self.position_of(owner), self.position_of(entity)) {
            (Some(origin), Some(pos)) => origin.distance(pos) <= shape.radius,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CategoryMask;

    #[test]
    fn test_part_follows_parent() {
        let mut scene = Scene::new();
        let root = scene.spawn_root("knight", Position::new(1.0, 0.0, 1.0), 0);
        let part = scene.spawn_part(root, "hurtbox", Position::Y, 3).unwrap();

        assert_eq!(scene.position_of(part), Some(Position::new(1.0, 1.0, 1.0)));
        scene.set_position(root, Position::new(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.position_of(part), Some(Position::new(5.0, 1.0, 0.0)));
    }

    #[test]
    fn test_spawn_part_under_unknown_parent_fails() {
        let mut scene = Scene::new();
        let result = scene.spawn_part(EntityId::new(), "orphan", Position::ZERO, 0);
        assert!(matches!(result, Err(CombatError::EntityNotFound(_))));
    }

    #[test]
    fn test_group_root_and_members() {
        let mut scene = Scene::new();
        let root = scene.spawn_root("knight", Position::ZERO, 0);
        let a = scene.spawn_part(root, "hurtbox", Position::ZERO, 3).unwrap();
        let b = scene.spawn_part(root, "shield", Position::ZERO, 3).unwrap();

        assert_eq!(scene.group_root(a), root);
        assert_eq!(scene.group_root(root), root);
        assert_eq!(scene.group_members(root), vec![root, a, b]);
    }

    #[test]
    fn test_destroy_makes_handles_stale() {
        let mut scene = Scene::new();
        let root = scene.spawn_root("knight", Position::ZERO, 0);
        let part = scene.spawn_part(root, "hurtbox", Position::ZERO, 3).unwrap();
        scene.destroy(root);

        assert!(scene.position_of(part).is_none());
        assert!(scene.group_members(root).is_empty());
        assert_eq!(scene.enabled_bodies().count(), 0);
    }

    #[test]
    fn test_is_within_respects_radius_mask_and_enabled() {
        let mut scene = Scene::new();
        let owner = scene.spawn_root("guard", Position::ZERO, 0);
        let other = scene.spawn_root("intruder", Position::new(3.0, 0.0, 0.0), 3);
        scene.bind_region(
            owner,
            Region::Detection,
            RegionShape {
                radius: 5.0,
                mask: CategoryMask::of(&[3]),
            },
        );

        assert!(scene.is_within(owner, Region::Detection, other));
        assert!(!scene.is_within(owner, Region::Attack, other)); // unbound

        scene.set_position(other, Position::new(6.0, 0.0, 0.0)).unwrap();
        assert!(!scene.is_within(owner, Region::Detection, other));

        scene.set_position(other, Position::new(1.0, 0.0, 0.0)).unwrap();
        scene.set_group_enabled(other, false);
        assert!(!scene.is_within(owner, Region::Detection, other));
    }
}
