//! Presentation listeners
//!
//! State-only collaborators subscribed to a combatant's tracker bus. They
//! decide what to face and which animator flags to raise; turning that into
//! rotations and blended clips is left to the renderer.

pub mod animator;
pub mod look_around;
pub mod look_at;

pub use animator::CombatAnimator;
pub use look_around::{LookDirection, RandomLookAround};
pub use look_at::LookAtTarget;
