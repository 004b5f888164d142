//! Proximity Combat - target acquisition and combat state for simulated fighters
//!
//! Sensors turn overlap into region enter/exit signals, trackers turn those
//! into edge-triggered target and combat events, and the lifecycle hub keeps
//! every tracker consistent when combatants die or come back.

pub mod combat;
pub mod core;
pub mod events;
pub mod perception;
pub mod presentation;
pub mod simulation;
pub mod spatial;
