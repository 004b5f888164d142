//! Combat state derived from the attackable set
//!
//! No flag is stored: a combatant is in combat exactly while something is
//! in its attack region.

use serde::{Deserialize, Serialize};

use crate::perception::entity_set::{Edge, EntitySet};
use crate::perception::tracker::TrackerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatState {
    #[default]
    Idle,
    InCombat,
}

impl CombatState {
    /// State implied by the current attackable set
    pub fn derive(attackable: &EntitySet) -> Self {
        if attackable.is_empty() {
            CombatState::Idle
        } else {
            CombatState::InCombat
        }
    }

    /// Transition taken on an attackable-set edge, with the event announcing it
    pub fn transition(edge: Edge) -> (CombatState, TrackerEvent) {
        match edge {
            Edge::BecameNonEmpty => (CombatState::InCombat, TrackerEvent::CombatStarted),
            Edge::BecameEmpty => (CombatState::Idle, TrackerEvent::CombatEnded),
        }
    }

    pub fn in_combat(&self) -> bool {
        matches!(self, CombatState::InCombat)
    }
}
