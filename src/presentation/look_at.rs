//! Facing toward the acquired target

use std::any::Any;

use crate::core::types::{EntityId, Position};
use crate::events::bus::Listener;
use crate::perception::tracker::TrackerEvent;
use crate::spatial::resolver::SpatialResolver;

/// Below this squared distance the direction is too noisy to face
const MIN_FACING_DISTANCE_SQ: f32 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct LookAtTarget {
    target: Option<EntityId>,
}

impl LookAtTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Unit direction from `own` toward the target, flattened onto the
    /// ground plane when `rotate_only_around_y` is set
    pub fn facing(
        &self,
        own: Position,
        resolver: &impl SpatialResolver,
        rotate_only_around_y: bool,
    ) -> Option<Position> {
        let target_pos = resolver.position_of(self.target?)?;
        let mut direction = target_pos - own;
        if rotate_only_around_y {
            direction.y = 0.0;
        }
        if direction.length_squared() < MIN_FACING_DISTANCE_SQ {
            return None;
        }
        Some(direction.normalize())
    }
}

impl Listener<TrackerEvent> for LookAtTarget {
    fn name(&self) -> &str {
        "look_at_target"
    }

    fn on_event(&mut self, event: &TrackerEvent) {
        match *event {
            TrackerEvent::TargetAcquired(anchor) => self.target = Some(anchor),
            TrackerEvent::TargetLost => self.target = None,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
