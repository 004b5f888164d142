//! Combat damage - decides who a landed attack hurts

use crate::core::config::DamageConfig;
use crate::core::types::EntityId;
use crate::perception::tracker::TrackerEvent;

/// Follows one combatant's tracker events and resolves attack hits
#[derive(Debug, Clone)]
pub struct CombatDamage {
    damage_amount: f32,
    target: Option<EntityId>,
    in_combat: bool,
    enabled: bool,
}

impl CombatDamage {
    pub fn new(config: &DamageConfig) -> Self {
        Self {
            damage_amount: config.damage_amount,
            target: None,
            in_combat: false,
            enabled: true,
        }
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_tracker_event(&mut self, event: &TrackerEvent) {
        match *event {
            TrackerEvent::TargetAcquired(anchor) => self.target = Some(anchor),
            TrackerEvent::CombatStarted => self.in_combat = true,
            TrackerEvent::CombatEnded => self.in_combat = false,
            TrackerEvent::TargetLost => {}
        }
    }

    /// Owner died: stop dealing damage until revived
    pub fn on_self_death(&mut self) {
        self.in_combat = false;
        self.enabled = false;
    }

    /// Owner revived; `in_combat` is the owner's tracker state at that point
    pub fn on_self_revived(&mut self, in_combat: bool) {
        self.enabled = true;
        self.in_combat = in_combat;
    }

    /// The held target died; stop aiming at it
    pub fn on_target_death(&mut self, entity: EntityId) {
        if self.target == Some(entity) {
            self.target = None;
        }
    }

    /// Target and amount for a landed attack, if one should apply
    pub fn attack_hit(&self) -> Option<(EntityId, f32)> {
        if !self.enabled || !self.in_combat {
            return None;
        }
        self.target.map(|target| (target, self.damage_amount))
    }
}
