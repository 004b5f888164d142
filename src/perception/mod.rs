//! Perception: what each combatant currently tracks
//!
//! - [`EntitySet`]: insertion-ordered handle set with emptiness edges
//! - [`TargetTracker`]: detection/attack sets, nearest-target recompute and
//!   the edge-triggered [`TrackerEvent`]s

pub mod entity_set;
pub mod tracker;

pub use entity_set::{Edge, EntitySet};
pub use tracker::{RegionBindings, TargetTracker, TrackerEvent};
