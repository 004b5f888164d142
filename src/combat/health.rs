//! Health pool with death and revival
//!
//! Every operation returns the events it raised, in the order collaborators
//! should see them. Invalid arguments are logged and ignored.

use serde::{Deserialize, Serialize};

use crate::core::config::HealthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HealthEvent {
    Changed { current: f32, max: f32 },
    Damaged(f32),
    Healed(f32),
    Died,
    Revived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    max_health: f32,
    current_health: f32,
    dead: bool,
}

impl Health {
    pub fn new(config: &HealthConfig) -> Self {
        let max_health = config.max_health;
        let current_health = config.starting_health.clamp(0.0, max_health.max(0.0));
        let dead = current_health <= 0.0;
        if dead {
            tracing::warn!(starting_health = config.starting_health, "Health starts dead (health <= 0)");
        }
        Self {
            max_health,
            current_health,
            dead,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn current(&self) -> f32 {
        self.current_health
    }

    pub fn max(&self) -> f32 {
        self.max_health
    }

    /// Fraction of max health remaining, 0 when max is not positive
    pub fn percentage(&self) -> f32 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }

    fn changed(&self) -> HealthEvent {
        HealthEvent::Changed {
            current: self.current_health,
            max: self.max_health,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> Vec<HealthEvent> {
        if amount.is_nan() || amount <= 0.0 {
            tracing::warn!(amount, "take_damage called with invalid amount");
            return Vec::new();
        }
        if self.dead {
            return Vec::new();
        }

        self.current_health = (self.current_health - amount).max(0.0);
        let mut events = vec![HealthEvent::Damaged(amount), self.changed()];

        if self.current_health <= 0.0 {
            events.extend(self.die());
        }
        events
    }

    pub fn heal(&mut self, amount: f32) -> Vec<HealthEvent> {
        if amount.is_nan() || amount <= 0.0 {
            tracing::warn!(amount, "heal called with invalid amount");
            return Vec::new();
        }
        if self.dead {
            return Vec::new();
        }

        let previous = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health);
        if previous >= self.current_health {
            return Vec::new();
        }
        vec![HealthEvent::Healed(amount), self.changed()]
    }

    /// Bring a dead entity back, at `amount` (clamped to `[1, max]`) or full
    pub fn revive(&mut self, amount: Option<f32>) -> Vec<HealthEvent> {
        if !self.dead {
            tracing::warn!("revive called but not dead");
            return Vec::new();
        }

        self.dead = false;
        self.current_health = match amount {
            Some(amount) => amount.clamp(1.0_f32.min(self.max_health), self.max_health),
            None => self.max_health,
        };
        vec![HealthEvent::Revived, self.changed()]
    }

    pub fn set_max_health(&mut self, max_health: f32) -> Vec<HealthEvent> {
        if max_health.is_nan() || max_health <= 0.0 {
            tracing::warn!(max_health, "set_max_health called with invalid value");
            return Vec::new();
        }

        self.max_health = max_health;
        self.current_health = self.current_health.min(max_health);
        vec![self.changed()]
    }

    pub fn restore_to_full(&mut self) -> Vec<HealthEvent> {
        self.set_health(self.max_health)
    }

    /// Set health directly, dying or reviving when crossing zero
    fn set_health(&mut self, health: f32) -> Vec<HealthEvent> {
        self.current_health = health.clamp(0.0, self.max_health);
        let mut events = vec![self.changed()];

        if self.current_health <= 0.0 && !self.dead {
            events.extend(self.die());
        } else if self.current_health > 0.0 && self.dead {
            let health = self.current_health;
            events.extend(self.revive(Some(health)));
        }
        events
    }

    fn die(&mut self) -> Vec<HealthEvent> {
        self.dead = true;
        vec![HealthEvent::Died]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health() -> Health {
        Health::new(&HealthConfig::default())
    }

    #[test]
    fn test_damage_then_death() {
        let mut h = health();
        assert_eq!(
            h.take_damage(40.0),
            vec![HealthEvent::Damaged(40.0), HealthEvent::Changed { current: 60.0, max: 100.0 }]
        );
        let events = h.take_damage(80.0);
        assert_eq!(events.last(), Some(&HealthEvent::Died));
        assert_eq!(h.current(), 0.0);
        assert!(h.is_dead());

        // Dead entities take no more damage
        assert!(h.take_damage(10.0).is_empty());
    }

    #[test]
    fn test_invalid_amounts_are_ignored() {
        let mut h = health();
        assert!(h.take_damage(0.0).is_empty());
        assert!(h.take_damage(-5.0).is_empty());
        assert!(h.take_damage(f32::NAN).is_empty());
        assert!(h.heal(0.0).is_empty());
        assert!(h.set_max_health(-1.0).is_empty());
        assert_eq!(h.current(), 100.0);
    }

    #[test]
    fn test_heal_clamps_and_skips_full() {
        let mut h = health();
        assert!(h.heal(10.0).is_empty());

        h.take_damage(30.0);
        assert_eq!(
            h.heal(50.0),
            vec![HealthEvent::Healed(50.0), HealthEvent::Changed { current: 100.0, max: 100.0 }]
        );
    }

    #[test]
    fn test_revive_only_when_dead() {
        let mut h = health();
        assert!(h.revive(None).is_empty());

        h.take_damage(100.0);
        assert_eq!(
            h.revive(Some(0.2)),
            vec![HealthEvent::Revived, HealthEvent::Changed { current: 1.0, max: 100.0 }]
        );
        assert!(!h.is_dead());

        h.take_damage(100.0);
        h.revive(None);
        assert_eq!(h.current(), 100.0);
    }

    #[test]
    fn test_set_max_health_clamps_current() {
        let mut h = health();
        assert_eq!(h.set_max_health(50.0), vec![HealthEvent::Changed { current: 50.0, max: 50.0 }]);
        assert_eq!(h.percentage(), 1.0);
    }

    #[test]
    fn test_restore_to_full_revives() {
        let mut h = health();
        h.take_damage(100.0);
        let events = h.restore_to_full();
        assert!(events.contains(&HealthEvent::Revived));
        assert!(!h.is_dead());
        assert_eq!(h.current(), 100.0);
    }

    #[test]
    fn test_starting_dead() {
        let h = Health::new(&HealthConfig {
            starting_health: 0.0,
            ..HealthConfig::default()
        });
        assert!(h.is_dead());
        assert_eq!(h.percentage(), 0.0);
    }
}
