//! Animator flags driven by combat and lifecycle

use std::any::Any;

use crate::events::bus::Listener;
use crate::perception::tracker::TrackerEvent;

/// The two boolean parameters an animation controller reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatAnimator {
    pub in_combat: bool,
    pub dead: bool,
}

impl CombatAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dead characters are never shown fighting
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
        if dead {
            self.in_combat = false;
        }
    }

    /// Back from the dead, fighting again if the tracker still is
    pub fn revive(&mut self, in_combat: bool) {
        self.dead = false;
        self.in_combat = in_combat;
    }
}

impl Listener<TrackerEvent> for CombatAnimator {
    fn name(&self) -> &str {
        "combat_animator"
    }

    fn on_event(&mut self, event: &TrackerEvent) {
        match event {
            TrackerEvent::CombatStarted => {
                self.in_combat = true;
                tracing::debug!("Entering combat state");
            }
            TrackerEvent::CombatEnded => {
                self.in_combat = false;
                tracing::debug!("Exiting combat state");
            }
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_flag_tracks_events() {
        let mut anim = CombatAnimator::new();
        anim.on_event(&TrackerEvent::CombatStarted);
        assert!(anim.in_combat);
        anim.on_event(&TrackerEvent::TargetLost);
        assert!(anim.in_combat);
        anim.on_event(&TrackerEvent::CombatEnded);
        assert!(!anim.in_combat);
    }

    #[test]
    fn test_death_clears_combat_and_revival_restores_it() {
        let mut anim = CombatAnimator::new();
        anim.on_event(&TrackerEvent::CombatStarted);

        anim.set_dead(true);
        assert!(anim.dead);
        assert!(!anim.in_combat);

        anim.revive(true);
        assert!(!anim.dead);
        assert!(anim.in_combat);

        anim.set_dead(true);
        anim.revive(false);
        assert!(!anim.in_combat);
    }
}
