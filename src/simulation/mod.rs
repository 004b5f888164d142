//! Simulation host: the world, its combatants and the frame loop

pub mod tick;
pub mod world;

pub use tick::{run_combat_tick, EventKind, SimulationEvent};
pub use world::{Combatant, World};
