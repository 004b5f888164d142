//! Proximity regions and the signals they raise

use serde::{Deserialize, Serialize};

use crate::core::types::{CategoryMask, EntityId};

/// One of the two concentric zones around a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Outer zone: entities here are candidates for facing/targeting
    Detection,
    /// Inner zone: entities here keep the owner in combat
    Attack,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Detection, Region::Attack];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Detection => write!(f, "detection"),
            Region::Attack => write!(f, "attack"),
        }
    }
}

/// Sphere bound to a region of one owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionShape {
    pub radius: f32,
    pub mask: CategoryMask,
}

/// Enter/exit signal from the spatial source, already mask-filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSignal {
    Enter(Region, EntityId),
    Exit(Region, EntityId),
}

impl RegionSignal {
    pub fn region(&self) -> Region {
        match self {
            RegionSignal::Enter(region, _) | RegionSignal::Exit(region, _) => *region,
        }
    }

    pub fn entity(&self) -> EntityId {
        match self {
            RegionSignal::Enter(_, entity) | RegionSignal::Exit(_, entity) => *entity,
        }
    }
}
