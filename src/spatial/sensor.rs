//! Proximity sensors - trigger-volume emulation feeding the trackers
//!
//! Each sensor belongs to one (owner, region) pair and remembers which
//! bodies overlapped it last frame. Diffing against this frame's overlap
//! yields the enter/exit signals the tracking core consumes.

use ahash::AHashSet;

use crate::core::types::EntityId;
use crate::spatial::region::{Region, RegionSignal};
use crate::spatial::resolver::SpatialResolver;
use crate::spatial::scene::Scene;
use crate::spatial::sparse_hash::SparseHashGrid;

#[derive(Debug, Clone)]
pub struct ProximitySensor {
    pub owner: EntityId,
    pub region: Region,
    enabled: bool,
    /// Overlapping bodies in first-overlap order
    inside: Vec<EntityId>,
}

impl ProximitySensor {
    pub fn new(owner: EntityId, region: Region) -> Self {
        Self {
            owner,
            region,
            enabled: true,
            inside: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the sensor off or on
    ///
    /// Turning it off forgets every overlap without raising exits, the way a
    /// trigger collider behaves when disabled. Turning it back on makes the
    /// next `sense` report everything in range as a fresh enter.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.inside.clear();
        }
    }

    pub fn inside(&self) -> &[EntityId] {
        &self.inside
    }

    /// Drop a body without raising an exit
    ///
    /// For bodies switched off between two `sense` calls: once back on they
    /// must be reported as a fresh enter.
    pub fn forget(&mut self, entity: EntityId) -> bool {
        let before = self.inside.len();
        self.inside.retain(|&e| e != entity);
        self.inside.len() != before
    }

    /// Diff this frame's overlap against the last one
    ///
    /// Enters are reported before exits so a hand-off between two bodies
    /// never briefly empties the region. Bodies that vanished or were
    /// disabled drop out silently; they are not exits.
    pub fn sense(&mut self, scene: &Scene, grid: &SparseHashGrid) -> Vec<RegionSignal> {
        if !self.enabled {
            return Vec::new();
        }
        let Some(shape) = scene.region_shape(self.owner, self.region) else {
            return Vec::new();
        };
        let Some(origin) = scene.position_of(self.owner) else {
            return Vec::new();
        };

        let mut seen = AHashSet::new();
        let overlapping: Vec<EntityId> = grid
            .query_radius(origin, shape.radius)
            .filter(|&candidate| seen.insert(candidate))
            .filter(|&candidate| scene.group_root(candidate) != self.owner)
            .filter(|&candidate| scene.is_within(self.owner, self.region, candidate))
            .collect();

        let mut signals = Vec::new();
        for &entity in &overlapping {
            if !self.inside.contains(&entity) {
                signals.push(RegionSignal::Enter(self.region, entity));
            }
        }

        let mut still_inside = Vec::with_capacity(overlapping.len());
        for &entity in &self.inside {
            if overlapping.contains(&entity) {
                still_inside.push(entity);
            } else if scene.is_enabled(entity) {
                signals.push(RegionSignal::Exit(self.region, entity));
            } else {
                tracing::debug!(
                    owner = %self.owner,
                    entity = %entity,
                    region = %self.region,
                    "Body disabled or gone, dropping without exit"
                );
            }
        }
        for &entity in &overlapping {
            if !still_inside.contains(&entity) {
                still_inside.push(entity);
            }
        }
        self.inside = still_inside;

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CategoryMask, Position};
    use crate::spatial::region::RegionShape;

    fn setup() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let owner = scene.spawn_root("guard", Position::ZERO, 0);
        scene.bind_region(
            owner,
            Region::Detection,
            RegionShape {
                radius: 5.0,
                mask: CategoryMask::of(&[3]),
            },
        );
        (scene, owner)
    }

    fn grid_for(scene: &Scene) -> SparseHashGrid {
        let mut grid = SparseHashGrid::new(4.0);
        grid.rebuild(scene.enabled_bodies());
        grid
    }

    #[test]
    fn test_enter_then_exit() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);
        let other = scene.spawn_root("intruder", Position::new(3.0, 0.0, 0.0), 3);

        let signals = sensor.sense(&scene, &grid_for(&scene));
        assert_eq!(signals, vec![RegionSignal::Enter(Region::Detection, other)]);

        // Staying inside is quiet
        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());

        scene.set_position(other, Position::new(8.0, 0.0, 0.0)).unwrap();
        let signals = sensor.sense(&scene, &grid_for(&scene));
        assert_eq!(signals, vec![RegionSignal::Exit(Region::Detection, other)]);
    }

    #[test]
    fn test_mask_filters_categories() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);
        scene.spawn_root("rock", Position::new(1.0, 0.0, 0.0), 1);

        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());
    }

    #[test]
    fn test_own_parts_are_ignored() {
        let (mut scene, owner) = setup();
        scene.spawn_part(owner, "own hurtbox", Position::ZERO, 3).unwrap();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);

        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());
    }

    #[test]
    fn test_disabled_body_drops_silently_and_reenters() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);
        let other = scene.spawn_root("intruder", Position::new(1.0, 0.0, 0.0), 3);
        sensor.sense(&scene, &grid_for(&scene));

        scene.set_group_enabled(other, false);
        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());
        assert!(sensor.inside().is_empty());

        scene.set_group_enabled(other, true);
        let signals = sensor.sense(&scene, &grid_for(&scene));
        assert_eq!(signals, vec![RegionSignal::Enter(Region::Detection, other)]);
    }

    #[test]
    fn test_forgotten_body_reenters_without_exit() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);
        let other = scene.spawn_root("intruder", Position::new(1.0, 0.0, 0.0), 3);
        sensor.sense(&scene, &grid_for(&scene));

        assert!(sensor.forget(other));
        assert!(!sensor.forget(other));
        let signals = sensor.sense(&scene, &grid_for(&scene));
        assert_eq!(signals, vec![RegionSignal::Enter(Region::Detection, other)]);
    }

    #[test]
    fn test_disabled_sensor_forgets_and_refires() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Detection);
        let other = scene.spawn_root("intruder", Position::new(1.0, 0.0, 0.0), 3);
        sensor.sense(&scene, &grid_for(&scene));

        sensor.set_enabled(false);
        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());

        sensor.set_enabled(true);
        let signals = sensor.sense(&scene, &grid_for(&scene));
        assert_eq!(signals, vec![RegionSignal::Enter(Region::Detection, other)]);
    }

    #[test]
    fn test_unbound_region_is_silent() {
        let (mut scene, owner) = setup();
        let mut sensor = ProximitySensor::new(owner, Region::Attack);
        scene.spawn_root("intruder", Position::new(1.0, 0.0, 0.0), 3);

        assert!(sensor.sense(&scene, &grid_for(&scene)).is_empty());
    }
}
