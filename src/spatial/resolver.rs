//! Boundary between the tracking core and whatever owns world geometry

use crate::core::types::{EntityId, Position};
use crate::spatial::region::Region;

/// Read-only view of world geometry consumed by the tracking core
///
/// The core never stores positions; it asks here every time and treats a
/// `None` as a destroyed entity.
pub trait SpatialResolver {
    /// Current world position, or `None` for a stale handle
    fn position_of(&self, entity: EntityId) -> Option<Position>;

    /// Anchor reported to presentation: the grouping root of a sub-part,
    /// or the entity itself when it has no parent
    fn group_root(&self, entity: EntityId) -> EntityId;

    /// Every trackable handle belonging to a character, root included
    fn group_members(&self, root: EntityId) -> Vec<EntityId>;

    /// Is `entity` currently inside `owner`'s region bounds?
    ///
    /// Unresolvable owners or entities, unbound regions and disabled bodies
    /// all count as outside.
    fn is_within(&self, owner: EntityId, region: Region, entity: EntityId) -> bool;
}
