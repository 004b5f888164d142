//! Combat configuration with documented constants
//!
//! Every tunable lives here with an explanation of what it drives. Values
//! are fixed for the lifetime of whatever was built from them; changing a
//! config only affects combatants spawned afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};
use crate::core::types::CategoryMask;

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub tracker: TrackerConfig,
    pub regions: RegionsConfig,
    pub health: HealthConfig,
    pub damage: DamageConfig,
    pub look_around: LookAroundConfig,
    pub spatial: SpatialConfig,
}

/// Target tracker cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between nearest-target recomputes
    ///
    /// Region enter/exit is applied immediately; only the choice of which
    /// detected entity to face is throttled. At 0.5 the anchor reported to
    /// presentation can lag a change in ordering by up to half a second.
    pub update_target_interval: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            update_target_interval: 0.5,
        }
    }
}

/// Shape and filter of one proximity region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Sphere radius around the owner. `None` leaves the region unbound:
    /// the tracker logs the misconfiguration and ignores that region.
    pub radius: Option<f32>,
    /// Body categories the region reacts to
    pub mask: CategoryMask,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            radius: None,
            mask: CategoryMask::ALL,
        }
    }
}

/// Detection and attack regions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    pub detection: RegionConfig,
    pub attack: RegionConfig,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            detection: RegionConfig {
                radius: Some(10.0),
                ..RegionConfig::default()
            },
            attack: RegionConfig {
                radius: Some(2.0),
                ..RegionConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_health: f32,
    /// Clamped into `[0, max_health]`; zero means the entity starts dead
    pub starting_health: f32,
    /// Remove the body from the world some time after death
    pub destroy_on_death: bool,
    /// Seconds between death and removal when `destroy_on_death` is set
    pub destroy_delay: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            starting_health: 100.0,
            destroy_on_death: false,
            destroy_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Damage applied per landed attack
    pub damage_amount: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self { damage_amount: 10.0 }
    }
}

/// Idle look-around behaviour while nothing is detected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookAroundConfig {
    /// Shortest hold on one direction (seconds)
    pub min_look_time: f32,
    /// Longest hold on one direction (seconds)
    pub max_look_time: f32,
    /// Total yaw sweep in degrees; picks fall in ±range/2
    pub look_angle_range: f32,
    /// When false, pitch also varies in ±range/4
    pub rotate_only_around_y: bool,
}

impl Default for LookAroundConfig {
    fn default() -> Self {
        Self {
            min_look_time: 2.0,
            max_look_time: 5.0,
            look_angle_range: 180.0,
            rotate_only_around_y: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Cell size of the broadphase hash grid (world units)
    ///
    /// Sensors query every cell within their region radius, so small cells
    /// mean more cells walked per query. Must be positive and finite.
    pub grid_cell_size: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { grid_cell_size: 4.0 }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CombatConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tracker.update_target_interval <= 0.0 {
            return Err(CombatError::InvalidConfig(format!(
                "update_target_interval ({}) must be positive",
                self.tracker.update_target_interval
            )));
        }

        for (name, region) in [
            ("detection", &self.regions.detection),
            ("attack", &self.regions.attack),
        ] {
            if let Some(radius) = region.radius {
                if radius <= 0.0 {
                    return Err(CombatError::InvalidConfig(format!(
                        "{} radius ({}) must be positive",
                        name, radius
                    )));
                }
            }
        }

        // Attack region sits inside the detection region
        if let (Some(detect), Some(attack)) =
            (self.regions.detection.radius, self.regions.attack.radius)
        {
            if attack > detect {
                return Err(CombatError::InvalidConfig(format!(
                    "attack radius ({}) should be <= detection radius ({})",
                    attack, detect
                )));
            }
        }

        if self.health.max_health <= 0.0 {
            return Err(CombatError::InvalidConfig(format!(
                "max_health ({}) must be positive",
                self.health.max_health
            )));
        }

        if self.look_around.min_look_time > self.look_around.max_look_time {
            return Err(CombatError::InvalidConfig(format!(
                "min_look_time ({}) should be <= max_look_time ({})",
                self.look_around.min_look_time, self.look_around.max_look_time
            )));
        }

        let cell = self.spatial.grid_cell_size;
        if !(cell.is_finite() && cell > 0.0) {
            return Err(CombatError::InvalidConfig(format!(
                "grid_cell_size ({}) must be positive and finite",
                cell
            )));
        }

        Ok(())
    }
}
