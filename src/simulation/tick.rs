//! Tick system - advances the world one frame
//!
//! Order within a frame:
//! destroy timers -> sense regions and apply enter/exit -> tracker recompute -> presentation
//!
//! Enter/exit must land before the recompute so the nearest target is never
//! picked from last frame's membership.

use serde::Serialize;

use crate::combat::health::HealthEvent;
use crate::core::types::{EntityId, Frame};
use crate::events::lifecycle::LifecycleEvent;
use crate::perception::tracker::TrackerEvent;
use crate::presentation::LookDirection;
use crate::simulation::world::World;
use crate::spatial::region::RegionSignal;

/// What happened, attributed to the entity it happened to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    Tracker(TrackerEvent),
    Health(HealthEvent),
    Lifecycle(LifecycleEvent),
    /// Idle look-around picked a new direction
    Looked(LookDirection),
    /// Removed from the world
    Despawned,
}

/// One entry of the world's event log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationEvent {
    pub frame: Frame,
    pub entity: EntityId,
    /// Name at the time of the event; the body may be gone since
    pub name: String,
    pub kind: EventKind,
}

impl World {
    /// Advance one frame of `dt` seconds and return everything logged since
    /// the previous drain
    pub fn tick(&mut self, dt: f32) -> Vec<SimulationEvent> {
        run_combat_tick(self, dt)
    }
}

pub fn run_combat_tick(world: &mut World, dt: f32) -> Vec<SimulationEvent> {
    if dt.is_nan() || dt < 0.0 {
        tracing::warn!(dt, "Ignoring invalid frame delta");
        return world.drain_events();
    }
    world.frame += 1;

    process_destroy_timers(world, dt);
    sense_regions(world);
    recompute_targets(world, dt);
    tick_presentation(world, dt);

    let events = world.drain_events();
    if !events.is_empty() {
        tracing::debug!(frame = world.frame, count = events.len(), "Frame events");
    }
    events
}

/// Remove dead combatants whose destroy delay ran out
fn process_destroy_timers(world: &mut World, dt: f32) {
    let mut expired = Vec::new();
    for combatant in &mut world.combatants {
        if let Some(remaining) = combatant.destroy_timer.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(combatant.id());
            }
        }
    }

    for id in expired {
        if let Err(e) = world.despawn(id) {
            tracing::warn!(entity = %id, error = %e, "Destroy after death failed");
        }
    }
}

/// Diff every sensor's overlap and feed the signals to its tracker
fn sense_regions(world: &mut World) {
    world.grid.rebuild(world.scene.enabled_bodies());

    for idx in 0..world.combatants.len() {
        let mut signals: Vec<RegionSignal> = Vec::new();
        {
            let combatant = &mut world.combatants[idx];
            for sensor in &mut combatant.sensors {
                signals.extend(sensor.sense(&world.scene, &world.grid));
            }
        }
        for signal in signals {
            let events = world.combatants[idx].tracker.apply(signal);
            world.route_tracker_events(idx, events);
        }
    }
}

fn recompute_targets(world: &mut World, dt: f32) {
    for idx in 0..world.combatants.len() {
        if world.combatants[idx].is_dead() {
            continue;
        }
        let events = world.combatants[idx].tracker.tick(dt, &world.scene);
        world.route_tracker_events(idx, events);
    }
}

fn tick_presentation(world: &mut World, dt: f32) {
    let mut looked = Vec::new();
    for combatant in &mut world.combatants {
        if combatant.is_dead() {
            continue;
        }
        let (id, name) = (combatant.id(), combatant.name().to_string());
        if let Some(direction) = combatant.look_around_mut().and_then(|look| look.tick(dt)) {
            looked.push((id, name, direction));
        }
    }
    for (id, name, direction) in looked {
        world.record(id, name, EventKind::Looked(direction));
    }
}
