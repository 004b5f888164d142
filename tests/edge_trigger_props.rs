//! Property tests for the edge-trigger discipline and nearest-target choice

use ahash::AHashSet;
use proptest::prelude::*;

use proximity_combat::core::config::TrackerConfig;
use proximity_combat::core::types::{EntityId, Position};
use proximity_combat::perception::{EntitySet, RegionBindings, TargetTracker, TrackerEvent};
use proximity_combat::spatial::Region;

#[derive(Debug, Clone, Copy)]
struct Op {
    enter: bool,
    attack: bool,
    entity: usize,
}

fn op() -> impl Strategy<Value = Op> {
    (any::<bool>(), any::<bool>(), 0usize..4).prop_map(|(enter, attack, entity)| Op {
        enter,
        attack,
        entity,
    })
}

proptest! {
    #[test]
    fn combat_edges_match_set_transitions(ops in prop::collection::vec(op(), 0..64)) {
        let entities: Vec<EntityId> = (0..4).map(|_| EntityId::new()).collect();
        let mut tracker = TargetTracker::new(EntityId::new(), &TrackerConfig::default(), RegionBindings::BOTH);

        // Plain sets as the reference model
        let mut detected = AHashSet::new();
        let mut attackable = AHashSet::new();

        for op in ops {
            let entity = entities[op.entity];
            let region = if op.attack { Region::Attack } else { Region::Detection };
            let model = if op.attack { &mut attackable } else { &mut detected };

            let was_empty = model.is_empty();
            if op.enter {
                model.insert(entity);
            } else {
                model.remove(&entity);
            }
            let now_empty = model.is_empty();

            let events = if op.enter {
                tracker.on_region_enter(region, entity)
            } else {
                tracker.on_region_exit(region, entity)
            };

            let expected = match (op.attack, was_empty, now_empty) {
                (true, true, false) => vec![TrackerEvent::CombatStarted],
                (true, false, true) => vec![TrackerEvent::CombatEnded],
                (false, false, true) => vec![TrackerEvent::TargetLost],
                _ => Vec::new(),
            };
            prop_assert_eq!(events, expected);
            prop_assert_eq!(tracker.in_combat(), !attackable.is_empty());
            prop_assert_eq!(tracker.detected().len(), detected.len());
        }
    }

    #[test]
    fn remove_target_never_fires_for_absent_entities(ops in prop::collection::vec(op(), 0..32)) {
        let entities: Vec<EntityId> = (0..4).map(|_| EntityId::new()).collect();
        let mut tracker = TargetTracker::new(EntityId::new(), &TrackerConfig::default(), RegionBindings::BOTH);
        for op in ops {
            let region = if op.attack { Region::Attack } else { Region::Detection };
            if op.enter {
                tracker.on_region_enter(region, entities[op.entity]);
            }
        }
        prop_assert!(tracker.remove_target(EntityId::new()).is_empty());
    }

    #[test]
    fn nearest_is_minimal_and_stable(coords in prop::collection::vec((-20i32..20, -20i32..20), 1..12)) {
        let owner = EntityId::new();
        let mut set = EntitySet::new(owner);
        let members: Vec<(EntityId, Position)> = coords
            .iter()
            .map(|&(x, z)| (EntityId::new(), Position::new(x as f32, 0.0, z as f32)))
            .collect();
        for (id, _) in &members {
            set.add(*id);
        }
        let position_of = |e: EntityId| members.iter().find(|(id, _)| *id == e).map(|(_, p)| *p);

        let nearest = set.nearest_to(Position::ZERO, position_of);
        prop_assert_eq!(nearest, set.nearest_to(Position::ZERO, position_of));

        let nearest = nearest.unwrap();
        let best = position_of(nearest).unwrap().length_squared();
        for (_, pos) in &members {
            prop_assert!(best <= pos.length_squared());
        }
        // Ties go to the first-inserted member
        let first_tied = members.iter().find(|(_, p)| p.length_squared() == best).map(|(id, _)| *id);
        prop_assert_eq!(Some(nearest), first_tied);
    }
}
