//! Idle look-around while nothing is targeted

use std::any::Any;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::LookAroundConfig;
use crate::events::bus::Listener;
use crate::perception::tracker::TrackerEvent;

/// Direction offset from the current facing, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LookDirection {
    pub yaw: f32,
    pub pitch: f32,
}

pub struct RandomLookAround {
    config: LookAroundConfig,
    enabled: bool,
    timer: f32,
    direction: LookDirection,
    rng: ChaCha8Rng,
}

impl RandomLookAround {
    /// Seeded so a replayed simulation looks around the same way
    pub fn new(config: &LookAroundConfig, seed: u64) -> Self {
        let mut look = Self {
            config: config.clone(),
            enabled: true,
            timer: 0.0,
            direction: LookDirection::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        look.pick_new_direction();
        look
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn direction(&self) -> LookDirection {
        self.direction
    }

    /// Count down and pick a new direction when the hold expires
    ///
    /// Returns the new direction when one was picked this call.
    pub fn tick(&mut self, dt: f32) -> Option<LookDirection> {
        if !self.enabled {
            return None;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.pick_new_direction();
        Some(self.direction)
    }

    fn pick_new_direction(&mut self) {
        let (min, max) = (self.config.min_look_time, self.config.max_look_time);
        self.timer = if min < max { self.rng.gen_range(min..max) } else { min };

        let half = self.config.look_angle_range / 2.0;
        let yaw = self.random_in(-half, half);
        let quarter = self.config.look_angle_range / 4.0;
        let pitch = self.random_in(-quarter, quarter);

        self.direction = LookDirection {
            yaw,
            pitch: if self.config.rotate_only_around_y { 0.0 } else { pitch },
        };
    }

    fn random_in(&mut self, low: f32, high: f32) -> f32 {
        if low < high {
            self.rng.gen_range(low..high)
        } else {
            low
        }
    }
}

impl Listener<TrackerEvent> for RandomLookAround {
    fn name(&self) -> &str {
        "random_look_around"
    }

    fn on_event(&mut self, event: &TrackerEvent) {
        match event {
            TrackerEvent::TargetAcquired(_) => self.enabled = false,
            TrackerEvent::TargetLost => self.enabled = true,
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
