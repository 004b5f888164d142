//! Target tracker - turns region signals into target and combat events
//!
//! The tracker owns two entity sets, one per region. Every mutation goes
//! through [`EntitySet::add_tracked`] / [`EntitySet::remove_tracked`], and
//! events are derived only from the edges those report. That single path is
//! what guarantees `CombatStarted`, `CombatEnded` and `TargetLost` fire once
//! per empty/non-empty transition rather than once per call.

use serde::{Deserialize, Serialize};

use crate::combat::state::CombatState;
use crate::core::config::TrackerConfig;
use crate::core::types::EntityId;
use crate::perception::entity_set::{Edge, EntitySet};
use crate::spatial::region::{Region, RegionSignal};
use crate::spatial::resolver::SpatialResolver;

/// Notification raised by a tracker for its owner's collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// Nearest detected entity, reported as its group root (anchor)
    TargetAcquired(EntityId),
    /// Detection set became empty
    TargetLost,
    /// Attackable set became non-empty
    CombatStarted,
    /// Attackable set became empty
    CombatEnded,
}

/// Which regions have a spatial source wired up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBindings {
    pub detection: bool,
    pub attack: bool,
}

impl RegionBindings {
    pub const BOTH: RegionBindings = RegionBindings {
        detection: true,
        attack: true,
    };

    pub fn is_bound(&self, region: Region) -> bool {
        match region {
            Region::Detection => self.detection,
            Region::Attack => self.attack,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TargetTracker {
    owner: EntityId,
    detected: EntitySet,
    attackable: EntitySet,
    current_target: Option<EntityId>,
    bindings: RegionBindings,
    update_interval: f32,
    timer: f32,
}

impl TargetTracker {
    pub fn new(owner: EntityId, config: &TrackerConfig, bindings: RegionBindings) -> Self {
        if !bindings.detection {
            tracing::error!(owner = %owner, "Detection region not bound; detection signals will be ignored");
        }
        if !bindings.attack {
            tracing::warn!(owner = %owner, "Attack region not bound; this combatant never enters combat");
        }

        let update_interval = if config.update_target_interval > 0.0 {
            config.update_target_interval
        } else {
            tracing::warn!(
                owner = %owner,
                interval = config.update_target_interval,
                "Non-positive target interval, using default"
            );
            TrackerConfig::default().update_target_interval
        };

        Self {
            owner,
            detected: EntitySet::new(owner),
            attackable: EntitySet::new(owner),
            current_target: None,
            bindings,
            update_interval,
            timer: 0.0,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn detected(&self) -> &EntitySet {
        &self.detected
    }

    pub fn attackable(&self) -> &EntitySet {
        &self.attackable
    }

    /// Anchor from the last recompute; may be stale until the next one
    pub fn current_target(&self) -> Option<EntityId> {
        self.current_target
    }

    pub fn combat_state(&self) -> CombatState {
        CombatState::derive(&self.attackable)
    }

    pub fn in_combat(&self) -> bool {
        self.combat_state().in_combat()
    }

    /// Could this tracker be holding `entity` in either set?
    pub fn holds(&self, entity: EntityId) -> bool {
        self.detected.contains(entity) || self.attackable.contains(entity)
    }

    pub fn apply(&mut self, signal: RegionSignal) -> Vec<TrackerEvent> {
        match signal {
            RegionSignal::Enter(region, entity) => self.on_region_enter(region, entity),
            RegionSignal::Exit(region, entity) => self.on_region_exit(region, entity),
        }
    }

    pub fn on_region_enter(&mut self, region: Region, entity: EntityId) -> Vec<TrackerEvent> {
        if !self.bindings.is_bound(region) {
            tracing::debug!(owner = %self.owner, region = %region, "Signal for unbound region ignored");
            return Vec::new();
        }
        tracing::debug!(owner = %self.owner, entity = %entity, region = %region, "Entered region");

        let edge = self.set_mut(region).add_tracked(entity);
        let mut events = Vec::new();
        self.push_edge(region, edge, &mut events);
        events
    }

    pub fn on_region_exit(&mut self, region: Region, entity: EntityId) -> Vec<TrackerEvent> {
        if !self.bindings.is_bound(region) {
            tracing::debug!(owner = %self.owner, region = %region, "Signal for unbound region ignored");
            return Vec::new();
        }
        tracing::debug!(owner = %self.owner, entity = %entity, region = %region, "Left region");

        let edge = self.set_mut(region).remove_tracked(entity);
        let mut events = Vec::new();
        self.push_edge(region, edge, &mut events);
        events
    }

    /// Forced removal from both sets (death handling)
    ///
    /// Only edges this call actually causes are reported, so removing an
    /// entity that was never attackable can't end combat.
    pub fn remove_target(&mut self, entity: EntityId) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        for region in Region::ALL {
            let edge = self.set_mut(region).remove_tracked(entity);
            self.push_edge(region, edge, &mut events);
        }
        if !events.is_empty() {
            tracing::debug!(owner = %self.owner, entity = %entity, "Target forcibly removed");
        }
        events
    }

    /// Advance the recompute timer and pick the nearest detected entity
    ///
    /// Enter/exit for this frame must already have been applied.
    pub fn tick(&mut self, dt: f32, resolver: &impl SpatialResolver) -> Vec<TrackerEvent> {
        if dt.is_nan() || dt < 0.0 {
            tracing::warn!(owner = %self.owner, dt, "Ignoring invalid tick delta");
            return Vec::new();
        }

        self.timer += dt;
        if self.timer < self.update_interval {
            return Vec::new();
        }
        self.timer = 0.0;

        let mut events = self.prune_stale(resolver);

        let Some(origin) = resolver.position_of(self.owner) else {
            tracing::debug!(owner = %self.owner, "Owner position unresolved, skipping target recompute");
            return events;
        };

        if let Some(nearest) = self.detected.nearest_to(origin, |e| resolver.position_of(e)) {
            let anchor = resolver.group_root(nearest);
            self.current_target = Some(anchor);
            tracing::debug!(owner = %self.owner, target = %anchor, "Current target");
            events.push(TrackerEvent::TargetAcquired(anchor));
        }

        events
    }

    /// Drop members whose bounds no longer contain them
    ///
    /// Used after a revival, when cached spatial state can't be trusted.
    /// Members are checked first and removed afterwards.
    pub fn revalidate(&mut self, resolver: &impl SpatialResolver) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        for region in Region::ALL {
            let outside: Vec<EntityId> = self
                .set(region)
                .iter()
                .filter(|&e| !resolver.is_within(self.owner, region, e))
                .collect();
            for entity in outside {
                tracing::debug!(owner = %self.owner, entity = %entity, region = %region, "Pruned out-of-bounds member");
                let edge = self.set_mut(region).remove_tracked(entity);
                self.push_edge(region, edge, &mut events);
            }
        }
        events
    }

    fn prune_stale(&mut self, resolver: &impl SpatialResolver) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        for region in Region::ALL {
            let set = self.set_mut(region);
            let was_empty = set.is_empty();
            let pruned = set.prune_unresolved(|e| resolver.position_of(e));
            if pruned.is_empty() {
                continue;
            }
            tracing::debug!(owner = %self.owner, region = %region, count = pruned.len(), "Pruned stale handles");
            let edge = (!was_empty && self.set(region).is_empty()).then_some(Edge::BecameEmpty);
            self.push_edge(region, edge, &mut events);
        }
        events
    }

    fn set(&self, region: Region) -> &EntitySet {
        match region {
            Region::Detection => &self.detected,
            Region::Attack => &self.attackable,
        }
    }

    fn set_mut(&mut self, region: Region) -> &mut EntitySet {
        match region {
            Region::Detection => &mut self.detected,
            Region::Attack => &mut self.attackable,
        }
    }

    fn push_edge(&mut self, region: Region, edge: Option<Edge>, events: &mut Vec<TrackerEvent>) {
        let Some(edge) = edge else {
            return;
        };
        match region {
            Region::Detection => {
                if edge == Edge::BecameEmpty {
                    self.current_target = None;
                    tracing::debug!(owner = %self.owner, "Target lost");
                    events.push(TrackerEvent::TargetLost);
                }
            }
            Region::Attack => {
                let (state, event) = CombatState::transition(edge);
                tracing::info!(owner = %self.owner, state = ?state, "Combat state changed");
                events.push(event);
            }
        }
    }
}
