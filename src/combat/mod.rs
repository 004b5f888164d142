pub mod damage;
pub mod health;
pub mod state;

pub use damage::CombatDamage;
pub use health::{Health, HealthEvent};
pub use state::CombatState;
