//! Death and revival broadcast
//!
//! The hub keeps the list of trackers that want lifecycle notifications and
//! the death registry. It does not own the trackers: the host hands them in
//! on every notification, and the hub reports which tracker raised which
//! event so the host can route them to the right bus.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::perception::tracker::{TargetTracker, TrackerEvent};
use crate::spatial::resolver::SpatialResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Died(EntityId),
    Revived(EntityId),
}

/// Cache of each dead entity's trackable handles
///
/// Filled on first death notification, emptied on revival so a revived
/// entity with new parts is never purged using an old handle list.
#[derive(Debug, Default)]
pub struct DeathRegistry {
    entries: AHashMap<EntityId, Vec<EntityId>>,
}

impl DeathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles belonging to `entity`, computed once and reused until invalidated
    pub fn resolve(&mut self, entity: EntityId, resolver: &impl SpatialResolver) -> &[EntityId] {
        self.entries
            .entry(entity)
            .or_insert_with(|| resolver.group_members(entity))
    }

    /// Returns true if an entry was dropped
    pub fn invalidate(&mut self, entity: EntityId) -> bool {
        self.entries.remove(&entity).is_some()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tracker event attributed to the tracker's owner
pub type OwnedEvent = (EntityId, TrackerEvent);

#[derive(Debug, Default)]
pub struct LifecycleEventHub {
    /// Owners of subscribed trackers, in subscription order
    subscribers: Vec<EntityId>,
    registry: DeathRegistry,
}

impl LifecycleEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the owner was already subscribed
    pub fn subscribe(&mut self, owner: EntityId) -> bool {
        if self.subscribers.contains(&owner) {
            return false;
        }
        self.subscribers.push(owner);
        true
    }

    /// Returns false if the owner was not subscribed
    pub fn unsubscribe(&mut self, owner: EntityId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|&o| o != owner);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, owner: EntityId) -> bool {
        self.subscribers.contains(&owner)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn registry(&self) -> &DeathRegistry {
        &self.registry
    }

    /// Entity left the world for good; nothing will revive it
    pub fn forget(&mut self, entity: EntityId) {
        self.registry.invalidate(entity);
        self.unsubscribe(entity);
    }

    /// Purge a dying entity from every other subscribed tracker
    pub fn notify_died<'a, R: SpatialResolver>(
        &mut self,
        entity: EntityId,
        trackers: impl IntoIterator<Item = &'a mut TargetTracker>,
        resolver: &R,
    ) -> Vec<OwnedEvent> {
        tracing::info!(entity = %entity, "Broadcasting death");

        let handles = self.registry.resolve(entity, resolver).to_vec();
        let mut events = Vec::new();

        for tracker in trackers {
            let owner = tracker.owner();
            if owner == entity || !self.subscribers.contains(&owner) {
                continue;
            }
            for &handle in &handles {
                if !tracker.holds(handle) {
                    continue;
                }
                events.extend(tracker.remove_target(handle).into_iter().map(|e| (owner, e)));
            }
        }

        events
    }

    /// Drop the revived entity's cached handles, then re-check every
    /// subscribed tracker against current bounds
    ///
    /// The invalidation has to come first: re-validation may be followed by
    /// fresh enters, and a later death must resolve handles anew.
    pub fn notify_revived<'a, R: SpatialResolver>(
        &mut self,
        entity: EntityId,
        trackers: impl IntoIterator<Item = &'a mut TargetTracker>,
        resolver: &R,
    ) -> Vec<OwnedEvent> {
        tracing::info!(entity = %entity, "Broadcasting revival");

        self.registry.invalidate(entity);

        let mut events = Vec::new();
        for tracker in trackers {
            let owner = tracker.owner();
            if !self.subscribers.contains(&owner) {
                continue;
            }
            events.extend(tracker.revalidate(resolver).into_iter().map(|e| (owner, e)));
        }
        events
    }
}
