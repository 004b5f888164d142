//! Entity sets - tracked handles with empty/non-empty edge reporting

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::core::types::{EntityId, Position};

/// Emptiness transition caused by a single mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The set went from empty to non-empty
    BecameNonEmpty,
    /// The set went from non-empty to empty
    BecameEmpty,
}

/// Set of weakly-held entity handles, relative to an owner
///
/// Iteration is in insertion order, which makes `nearest_to` deterministic:
/// among equally distant members the one added first wins.
#[derive(Debug, Clone)]
pub struct EntitySet {
    owner: EntityId,
    members: Vec<EntityId>,
    index: AHashSet<EntityId>,
}

impl EntitySet {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            members: Vec::new(),
            index: AHashSet::new(),
        }
    }

    /// Entity whose position distances are measured from
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Insert a handle; returns true if it was not already present
    pub fn add(&mut self, entity: EntityId) -> bool {
        if !self.index.insert(entity) {
            return false;
        }
        self.members.push(entity);
        true
    }

    /// Remove a handle; returns true if it was present
    pub fn remove(&mut self, entity: EntityId) -> bool {
        if !self.index.remove(&entity) {
            return false;
        }
        self.members.retain(|&e| e != entity);
        true
    }

    /// `add` plus the emptiness edge it caused, if any
    pub fn add_tracked(&mut self, entity: EntityId) -> Option<Edge> {
        let was_empty = self.is_empty();
        (self.add(entity) && was_empty).then_some(Edge::BecameNonEmpty)
    }

    /// `remove` plus the emptiness edge it caused, if any
    pub fn remove_tracked(&mut self, entity: EntityId) -> Option<Edge> {
        (self.remove(entity) && self.is_empty()).then_some(Edge::BecameEmpty)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.contains(&entity)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    pub fn for_each(&self, f: impl FnMut(EntityId)) {
        self.iter().for_each(f)
    }

    /// Member closest to `origin`
    ///
    /// Members `position_of` can't resolve are skipped. Ties go to the
    /// earliest-inserted member.
    pub fn nearest_to(
        &self,
        origin: Position,
        position_of: impl Fn(EntityId) -> Option<Position>,
    ) -> Option<EntityId> {
        self.members
            .iter()
            .filter_map(|&e| position_of(e).map(|pos| (e, origin.distance_squared(pos))))
            .min_by_key(|&(_, dist_sq)| OrderedFloat(dist_sq))
            .map(|(e, _)| e)
    }

    /// Drop members that no longer resolve to a position
    ///
    /// Stale handles are collected first and removed after the scan.
    /// Returns the removed handles in iteration order.
    pub fn prune_unresolved(&mut self, position_of: impl Fn(EntityId) -> Option<Position>) -> Vec<EntityId> {
        let stale: Vec<EntityId> = self
            .members
            .iter()
            .copied()
            .filter(|&e| position_of(e).is_none())
            .collect();
        for &entity in &stale {
            self.remove(entity);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut set = EntitySet::new(EntityId::new());
        let a = EntityId::new();

        assert!(set.add(a));
        assert!(!set.add(a));
        assert_eq!(set.len(), 1);

        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert!(set.is_empty());
    }

    #[test]
    fn test_edges_fire_only_on_transitions() {
        let mut set = EntitySet::new(EntityId::new());
        let a = EntityId::new();
        let b = EntityId::new();

        assert_eq!(set.add_tracked(a), Some(Edge::BecameNonEmpty));
        assert_eq!(set.add_tracked(b), None);
        assert_eq!(set.add_tracked(a), None);
        assert_eq!(set.remove_tracked(a), None);
        assert_eq!(set.remove_tracked(a), None);
        assert_eq!(set.remove_tracked(b), Some(Edge::BecameEmpty));
        assert_eq!(set.remove_tracked(b), None);
    }

    #[test]
    fn test_nearest_picks_minimum_distance() {
        let mut set = EntitySet::new(EntityId::new());
        let far = EntityId::new();
        let near = EntityId::new();
        let mut positions = AHashMap::new();
        positions.insert(far, Position::new(9.0, 0.0, 0.0));
        positions.insert(near, Position::new(0.0, 0.0, 2.0));
        set.add(far);
        set.add(near);

        let nearest = set.nearest_to(Position::ZERO, |e| positions.get(&e).copied());
        assert_eq!(nearest, Some(near));
    }

    #[test]
    fn test_nearest_ties_go_to_first_inserted() {
        let mut set = EntitySet::new(EntityId::new());
        let first = EntityId::new();
        let second = EntityId::new();
        set.add(first);
        set.add(second);

        for _ in 0..5 {
            let nearest = set.nearest_to(Position::ZERO, |_| Some(Position::X));
            assert_eq!(nearest, Some(first));
        }
    }

    #[test]
    fn test_nearest_skips_unresolved() {
        let mut set = EntitySet::new(EntityId::new());
        let gone = EntityId::new();
        let here = EntityId::new();
        set.add(gone);
        set.add(here);

        let nearest = set.nearest_to(Position::ZERO, |e| (e == here).then_some(Position::splat(50.0)));
        assert_eq!(nearest, Some(here));
        assert_eq!(set.nearest_to(Position::ZERO, |_| None), None);
    }

    #[test]
    fn test_prune_unresolved_removes_after_scan() {
        let mut set = EntitySet::new(EntityId::new());
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();
        set.add(a);
        set.add(b);
        set.add(c);

        let pruned = set.prune_unresolved(|e| (e == b).then_some(Position::ZERO));
        assert_eq!(pruned, vec![a, c]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_clear_and_for_each() {
        let mut set = EntitySet::new(EntityId::new());
        set.add(EntityId::new());
        set.add(EntityId::new());

        let mut count = 0;
        set.for_each(|_| count += 1);
        assert_eq!(count, 2);

        set.clear();
        assert!(set.is_empty());
    }
}
