//! World - owns every combatant and routes their events
//!
//! Combatants are explicit compositions of a tracker, two proximity sensors,
//! health, damage and a notification bus. Nothing is looked up reflectively:
//! the world holds each piece directly and is the only place where events
//! from one collaborator are handed to another.

use ahash::AHashMap;

use crate::combat::damage::CombatDamage;
use crate::combat::health::{Health, HealthEvent};
use crate::core::config::{CombatConfig, SpatialConfig};
use crate::core::error::{CombatError, Result};
use crate::core::types::{EntityId, Frame, Position};
use crate::events::bus::{NotificationBus, SubscriptionId};
use crate::events::lifecycle::{LifecycleEvent, LifecycleEventHub, OwnedEvent};
use crate::perception::tracker::{RegionBindings, TargetTracker, TrackerEvent};
use crate::presentation::{CombatAnimator, LookAtTarget, RandomLookAround};
use crate::simulation::tick::{EventKind, SimulationEvent};
use crate::spatial::region::{Region, RegionShape};
use crate::spatial::resolver::SpatialResolver;
use crate::spatial::scene::Scene;
use crate::spatial::sensor::ProximitySensor;
use crate::spatial::sparse_hash::SparseHashGrid;

/// One fighting character and everything attached to it
pub struct Combatant {
    id: EntityId,
    name: String,
    pub(crate) tracker: TargetTracker,
    pub(crate) sensors: [ProximitySensor; 2],
    pub(crate) health: Health,
    pub(crate) damage: CombatDamage,
    pub(crate) bus: NotificationBus<TrackerEvent>,
    look_at: SubscriptionId,
    look_around: SubscriptionId,
    animator: SubscriptionId,
    /// Seconds left before a dead combatant is removed
    pub(crate) destroy_timer: Option<f32>,
}

impl Combatant {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracker(&self) -> &TargetTracker {
        &self.tracker
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn damage(&self) -> &CombatDamage {
        &self.damage
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn sensor(&self, region: Region) -> &ProximitySensor {
        match region {
            Region::Detection => &self.sensors[0],
            Region::Attack => &self.sensors[1],
        }
    }

    pub fn look_at(&self) -> Option<&LookAtTarget> {
        self.bus.listener(self.look_at)
    }

    pub fn look_around(&self) -> Option<&RandomLookAround> {
        self.bus.listener(self.look_around)
    }

    pub(crate) fn look_around_mut(&mut self) -> Option<&mut RandomLookAround> {
        self.bus.listener_mut(self.look_around)
    }

    pub fn animator(&self) -> Option<&CombatAnimator> {
        self.bus.listener(self.animator)
    }

    fn animator_mut(&mut self) -> Option<&mut CombatAnimator> {
        self.bus.listener_mut(self.animator)
    }

    /// Extra collaborators subscribe here
    pub fn bus_mut(&mut self) -> &mut NotificationBus<TrackerEvent> {
        &mut self.bus
    }

    fn set_sensors_enabled(&mut self, enabled: bool) {
        for sensor in &mut self.sensors {
            sensor.set_enabled(enabled);
        }
    }
}

/// The simulation host
///
/// Combatants are kept in spawn order so every pass over them, and so every
/// event log, is deterministic.
pub struct World {
    pub(crate) config: CombatConfig,
    pub(crate) scene: Scene,
    pub(crate) grid: SparseHashGrid,
    pub(crate) combatants: Vec<Combatant>,
    index: AHashMap<EntityId, usize>,
    pub(crate) hub: LifecycleEventHub,
    pub(crate) frame: Frame,
    pub(crate) log: Vec<SimulationEvent>,
    seed: u64,
}

impl World {
    /// Build an empty world
    ///
    /// A cell size that is not positive and finite falls back to the
    /// default; every other setting is used as given.
    pub fn new(mut config: CombatConfig, seed: u64) -> Self {
        let cell = config.spatial.grid_cell_size;
        if !(cell.is_finite() && cell > 0.0) {
            let fallback = SpatialConfig::default().grid_cell_size;
            tracing::warn!(cell_size = cell, fallback, "Invalid grid cell size, using default");
            config.spatial.grid_cell_size = fallback;
        }
        let grid = SparseHashGrid::new(config.spatial.grid_cell_size);
        Self {
            config,
            scene: Scene::new(),
            grid,
            combatants: Vec::new(),
            index: AHashMap::new(),
            hub: LifecycleEventHub::new(),
            frame: 0,
            log: Vec::new(),
            seed,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hub(&self) -> &LifecycleEventHub {
        &self.hub
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.index.get(&id).map(|&i| &self.combatants[i])
    }

    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.index.get(&id).map(|&i| &mut self.combatants[i])
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }

    /// Everything logged since the last drain
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.log)
    }

    /// Add a combatant with regions bound from config and its tracker
    /// subscribed to lifecycle notifications
    pub fn spawn_combatant(&mut self, name: impl Into<String>, position: Position, category: u8) -> EntityId {
        let name = name.into();
        let id = self.scene.spawn_root(name.clone(), position, category);

        let mut bindings = RegionBindings::BOTH;
        for (region, region_config) in [
            (Region::Detection, &self.config.regions.detection),
            (Region::Attack, &self.config.regions.attack),
        ] {
            match region_config.radius {
                Some(radius) => self.scene.bind_region(
                    id,
                    region,
                    RegionShape {
                        radius,
                        mask: region_config.mask,
                    },
                ),
                None => match region {
                    Region::Detection => bindings.detection = false,
                    Region::Attack => bindings.attack = false,
                },
            }
        }

        let look_seed = self.seed.wrapping_add(self.combatants.len() as u64);
        let mut bus = NotificationBus::new();
        let look_at = bus.subscribe(LookAtTarget::new());
        let look_around = bus.subscribe(RandomLookAround::new(&self.config.look_around, look_seed));
        let animator = bus.subscribe(CombatAnimator::new());

        let combatant = Combatant {
            id,
            name: name.clone(),
            tracker: TargetTracker::new(id, &self.config.tracker, bindings),
            sensors: [
                ProximitySensor::new(id, Region::Detection),
                ProximitySensor::new(id, Region::Attack),
            ],
            health: Health::new(&self.config.health),
            damage: CombatDamage::new(&self.config.damage),
            bus,
            look_at,
            look_around,
            animator,
            destroy_timer: None,
        };

        self.hub.subscribe(id);
        self.index.insert(id, self.combatants.len());
        self.combatants.push(combatant);
        tracing::info!(entity = %id, name = %name, "Spawned combatant");

        if self.combatants[self.combatants.len() - 1].health.is_dead() {
            let idx = self.combatants.len() - 1;
            self.suspend(idx);
        }
        id
    }

    /// Attach a hurtbox or other trackable part to a body
    pub fn spawn_part(
        &mut self,
        parent: EntityId,
        name: impl Into<String>,
        offset: Position,
        category: u8,
    ) -> Result<EntityId> {
        self.scene.spawn_part(parent, name, offset, category)
    }

    /// Place a body (combatant or part) at a world position
    pub fn move_to(&mut self, entity: EntityId, position: Position) -> Result<()> {
        self.scene.set_position(entity, position)
    }

    /// Position of any body, `None` once it is gone
    pub fn position_of(&self, entity: EntityId) -> Option<Position> {
        self.scene.position_of(entity)
    }

    /// Direction the combatant should face toward its target
    pub fn facing(&self, id: EntityId) -> Option<Position> {
        let combatant = self.combatant(id)?;
        let own = self.scene.position_of(id)?;
        combatant
            .look_at()?
            .facing(own, &self.scene, self.config.look_around.rotate_only_around_y)
    }

    /// Remove a combatant for good
    ///
    /// Its tracker leaves the lifecycle hub, its listeners are dropped and
    /// its bodies are destroyed. Handles others still hold become stale.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let idx = self.index_of(id)?;
        let mut combatant = self.combatants.remove(idx);
        self.reindex();

        self.hub.forget(id);
        combatant.bus.clear();
        self.scene.destroy(id);

        tracing::info!(entity = %id, name = %combatant.name, "Despawned combatant");
        self.record(id, combatant.name, EventKind::Despawned);
        Ok(())
    }

    /// Tear everything down; safe to call more than once
    pub fn shutdown(&mut self) {
        if self.combatants.is_empty() {
            return;
        }
        tracing::info!(count = self.combatants.len(), "Shutting down world");
        let ids: Vec<EntityId> = self.combatants.iter().map(|c| c.id).collect();
        for id in ids {
            if let Err(e) = self.despawn(id) {
                tracing::warn!(entity = %id, error = %e, "Despawn during shutdown failed");
            }
        }
    }

    pub fn apply_damage(&mut self, target: EntityId, amount: f32) -> Result<()> {
        let idx = self.index_of(target)?;
        let events = self.combatants[idx].health.take_damage(amount);
        self.route_health_events(idx, events);
        Ok(())
    }

    pub fn heal(&mut self, target: EntityId, amount: f32) -> Result<()> {
        let idx = self.index_of(target)?;
        let events = self.combatants[idx].health.heal(amount);
        self.route_health_events(idx, events);
        Ok(())
    }

    /// Revive at `amount` health, or full when `None`
    pub fn revive(&mut self, target: EntityId, amount: Option<f32>) -> Result<()> {
        let idx = self.index_of(target)?;
        let events = self.combatants[idx].health.revive(amount);
        self.route_health_events(idx, events);
        Ok(())
    }

    pub fn set_max_health(&mut self, target: EntityId, max_health: f32) -> Result<()> {
        let idx = self.index_of(target)?;
        let events = self.combatants[idx].health.set_max_health(max_health);
        self.route_health_events(idx, events);
        Ok(())
    }

    pub fn restore_to_full(&mut self, target: EntityId) -> Result<()> {
        let idx = self.index_of(target)?;
        let events = self.combatants[idx].health.restore_to_full();
        self.route_health_events(idx, events);
        Ok(())
    }

    /// Land the attacker's current attack, if it has one to land
    ///
    /// Returns who was hit and for how much.
    pub fn attack_hit(&mut self, attacker: EntityId) -> Result<Option<(EntityId, f32)>> {
        let idx = self.index_of(attacker)?;
        let Some((target, amount)) = self.combatants[idx].damage.attack_hit() else {
            return Ok(None);
        };
        let Some(&target_idx) = self.index.get(&target) else {
            tracing::debug!(attacker = %attacker, target = %target, "Attack target is not a combatant");
            return Ok(None);
        };
        if self.combatants[target_idx].health.is_dead() {
            return Ok(None);
        }

        tracing::debug!(attacker = %attacker, target = %target, amount, "Attack hit");
        let events = self.combatants[target_idx].health.take_damage(amount);
        self.route_health_events(target_idx, events);
        Ok(Some((target, amount)))
    }

    pub(crate) fn index_of(&self, id: EntityId) -> Result<usize> {
        self.index.get(&id).copied().ok_or(CombatError::EntityNotFound(id))
    }

    fn reindex(&mut self) {
        self.index = self
            .combatants
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
    }

    pub(crate) fn record(&mut self, entity: EntityId, name: String, kind: EventKind) {
        self.log.push(SimulationEvent {
            frame: self.frame,
            entity,
            name,
            kind,
        });
    }

    /// Hand tracker events to the owner's damage component and bus, in order
    pub(crate) fn route_tracker_events(&mut self, idx: usize, events: Vec<TrackerEvent>) {
        if events.is_empty() {
            return;
        }
        let combatant = &mut self.combatants[idx];
        for event in &events {
            combatant.damage.on_tracker_event(event);
            combatant.bus.publish(event);
        }
        let (id, name) = (combatant.id, combatant.name.clone());
        for event in events {
            self.record(id, name.clone(), EventKind::Tracker(event));
        }
    }

    fn route_owned_events(&mut self, events: Vec<OwnedEvent>) {
        for (owner, event) in events {
            match self.index.get(&owner) {
                Some(&idx) => self.route_tracker_events(idx, vec![event]),
                None => tracing::warn!(owner = %owner, event = ?event, "Tracker event for unknown owner"),
            }
        }
    }

    fn route_health_events(&mut self, idx: usize, events: Vec<HealthEvent>) {
        let (id, name) = (self.combatants[idx].id, self.combatants[idx].name.clone());
        for event in events {
            self.record(id, name.clone(), EventKind::Health(event));
            match event {
                HealthEvent::Died => self.on_died(idx),
                HealthEvent::Revived => self.on_revived(idx),
                _ => {}
            }
        }
    }

    /// Take a combatant out of the fight without telling anyone yet
    fn suspend(&mut self, idx: usize) {
        let combatant = &mut self.combatants[idx];
        combatant.damage.on_self_death();
        if let Some(animator) = combatant.animator_mut() {
            animator.set_dead(true);
        }
        combatant.set_sensors_enabled(false);
        let id = combatant.id;

        let members = self.scene.group_members(id);
        for sensor in self.combatants.iter_mut().flat_map(|c| c.sensors.iter_mut()) {
            for &member in &members {
                sensor.forget(member);
            }
        }
        self.scene.set_group_enabled(id, false);
    }

    fn on_died(&mut self, idx: usize) {
        self.suspend(idx);
        let (id, name) = (self.combatants[idx].id, self.combatants[idx].name.clone());
        tracing::info!(entity = %id, name = %name, "Combatant died");
        self.record(id, name, EventKind::Lifecycle(LifecycleEvent::Died(id)));

        let purged = self.hub.notify_died(
            id,
            self.combatants.iter_mut().map(|c| &mut c.tracker),
            &self.scene,
        );
        self.route_owned_events(purged);

        for combatant in &mut self.combatants {
            combatant.damage.on_target_death(id);
        }

        if self.config.health.destroy_on_death {
            self.combatants[idx].destroy_timer = Some(self.config.health.destroy_delay);
        }
    }

    fn on_revived(&mut self, idx: usize) {
        let combatant = &mut self.combatants[idx];
        combatant.destroy_timer = None;
        combatant.set_sensors_enabled(true);
        let (id, name) = (combatant.id, combatant.name.clone());
        self.scene.set_group_enabled(id, true);

        tracing::info!(entity = %id, name = %name, "Combatant revived");
        self.record(id, name, EventKind::Lifecycle(LifecycleEvent::Revived(id)));

        let pruned = self.hub.notify_revived(
            id,
            self.combatants.iter_mut().map(|c| &mut c.tracker),
            &self.scene,
        );
        self.route_owned_events(pruned);

        // The own tracker kept its sets while dead, so a target still in reach
        // raises no fresh edge. Damage and animator follow the tracker instead.
        let combatant = &mut self.combatants[idx];
        let in_combat = combatant.tracker.in_combat();
        combatant.damage.on_self_revived(in_combat);
        if let Some(animator) = combatant.animator_mut() {
            animator.revive(in_combat);
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
