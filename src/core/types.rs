//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// World-space position of a body
pub type Position = glam::Vec3;

/// Opaque handle to a trackable world object
///
/// Equality and hashing are identity-based: two handles are the same entity
/// only if they were cloned from the same spawn, regardless of where the
/// bodies happen to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First group of the uuid is plenty to tell entities apart in logs
        let simple = self.0.simple().to_string();
        write!(f, "{}", &simple[..8])
    }
}

/// Frame counter (one per host `tick`)
pub type Frame = u64;

/// Bit mask of accepted body categories (layers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    pub const ALL: CategoryMask = CategoryMask(u32::MAX);
    pub const NONE: CategoryMask = CategoryMask(0);

    /// Mask accepting exactly the given categories
    pub fn of(categories: &[u8]) -> Self {
        Self(categories.iter().fold(0, |mask, &c| mask | Self::bit(c)))
    }

    /// Is a body on `category` accepted by this mask?
    pub fn contains(&self, category: u8) -> bool {
        Self::bit(category) & self.0 != 0
    }

    fn bit(category: u8) -> u32 {
        1u32.checked_shl(category as u32).unwrap_or(0)
    }
}

impl Default for CategoryMask {
    fn default() -> Self {
        Self::ALL
    }
}
