//! Static ship-class configuration.
//!
//! Loaded once at ship initialization from the external asset-data system.
//! Everything here is plain data; validation happens in `validate`, the only
//! fallible entry point in the library.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{ArmorLayerKind, DamageType};

/// Configuration problems detected at ship construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max hull strength must be positive, got {0}")]
    NonPositiveHull(f64),
    #[error("{pool} pool max energy must be positive, got {value}")]
    NonPositivePool { pool: &'static str, value: f64 },
    #[error("armor layer {layer:?} effectiveness {value} outside [0, 1]")]
    LayerEffectivenessOutOfRange { layer: ArmorLayerKind, value: f64 },
    #[error("shield quadrant strength must be non-negative, got {0}")]
    NegativeShieldStrength(f64),
    #[error("subsystem {name} damage radius must be positive, got {radius}")]
    NonPositiveSubsystemRadius { name: String, radius: f64 },
}

/// One armor layer's static profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorLayerConfig {
    /// Pass-through multiplier per damage type (1.0 = no resistance).
    /// Types missing from the table default to 1.0.
    pub resistance: BTreeMap<DamageType, f64>,
    /// Layer effectiveness in [0, 1].
    pub effectiveness: f64,
}

/// One energy pool's static profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_energy: f64,
    /// Regen at full allocation, energy units per second.
    pub base_regen_rate: f64,
}

/// One subsystem's placement and durability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemConfig {
    pub name: String,
    /// Position in ship-local space (meters).
    pub position: DVec3,
    /// Impacts within this radius of `position` damage the subsystem.
    pub damage_radius_m: f64,
    pub max_health: f64,
}

/// Complete static configuration for one ship class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipClassConfig {
    pub max_hull_strength: f64,
    /// Hull's own armor profile — a second resistance pass, independent of
    /// the layered armor stack.
    pub hull_armor: BTreeMap<DamageType, f64>,
    pub armor_layers: BTreeMap<ArmorLayerKind, ArmorLayerConfig>,
    /// Strength of each of the four shield quadrants.
    pub shield_quadrant_strength: f64,
    pub shield_pool: PoolConfig,
    pub weapon_pool: PoolConfig,
    pub engine_pool: PoolConfig,
    pub subsystems: Vec<SubsystemConfig>,
}

impl ShipClassConfig {
    /// Check all invariants the pipeline assumes. Called once at ship
    /// construction; the pipeline itself never fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hull_strength <= 0.0 {
            return Err(ConfigError::NonPositiveHull(self.max_hull_strength));
        }
        for (name, pool) in [
            ("shields", &self.shield_pool),
            ("weapons", &self.weapon_pool),
            ("engines", &self.engine_pool),
        ] {
            if pool.max_energy <= 0.0 {
                return Err(ConfigError::NonPositivePool {
                    pool: name,
                    value: pool.max_energy,
                });
            }
        }
        for (layer, cfg) in &self.armor_layers {
            if !(0.0..=1.0).contains(&cfg.effectiveness) {
                return Err(ConfigError::LayerEffectivenessOutOfRange {
                    layer: *layer,
                    value: cfg.effectiveness,
                });
            }
        }
        if self.shield_quadrant_strength < 0.0 {
            return Err(ConfigError::NegativeShieldStrength(
                self.shield_quadrant_strength,
            ));
        }
        for sub in &self.subsystems {
            if sub.damage_radius_m <= 0.0 {
                return Err(ConfigError::NonPositiveSubsystemRadius {
                    name: sub.name.clone(),
                    radius: sub.damage_radius_m,
                });
            }
        }
        Ok(())
    }

    /// Reference light-combatant loadout used by tests and as a template
    /// for asset-driven classes.
    pub fn corvette() -> Self {
        let mut hull_armor = BTreeMap::new();
        hull_armor.insert(DamageType::Kinetic, 0.9);
        hull_armor.insert(DamageType::Explosive, 0.85);

        let mut layers = BTreeMap::new();
        layers.insert(
            ArmorLayerKind::Outer,
            ArmorLayerConfig {
                resistance: BTreeMap::from([
                    (DamageType::Kinetic, 0.8),
                    (DamageType::Explosive, 0.7),
                    (DamageType::Beam, 0.9),
                ]),
                effectiveness: 1.0,
            },
        );
        layers.insert(
            ArmorLayerKind::Main,
            ArmorLayerConfig {
                resistance: BTreeMap::from([
                    (DamageType::Kinetic, 0.6),
                    (DamageType::Explosive, 0.65),
                    (DamageType::Collision, 0.5),
                ]),
                effectiveness: 1.0,
            },
        );
        layers.insert(
            ArmorLayerKind::Inner,
            ArmorLayerConfig {
                resistance: BTreeMap::from([(DamageType::Kinetic, 0.85)]),
                effectiveness: 1.0,
            },
        );
        layers.insert(
            ArmorLayerKind::Subsystem,
            ArmorLayerConfig {
                resistance: BTreeMap::from([(DamageType::Kinetic, 0.95)]),
                effectiveness: 1.0,
            },
        );

        Self {
            max_hull_strength: 1000.0,
            hull_armor,
            armor_layers: layers,
            shield_quadrant_strength: 250.0,
            shield_pool: PoolConfig {
                max_energy: 100.0,
                base_regen_rate: 6.0,
            },
            weapon_pool: PoolConfig {
                max_energy: 100.0,
                base_regen_rate: 4.0,
            },
            engine_pool: PoolConfig {
                max_energy: 100.0,
                base_regen_rate: 5.0,
            },
            subsystems: vec![
                SubsystemConfig {
                    name: "engines".into(),
                    position: DVec3::new(0.0, -40.0, 0.0),
                    damage_radius_m: 15.0,
                    max_health: 120.0,
                },
                SubsystemConfig {
                    name: "weapons".into(),
                    position: DVec3::new(0.0, 25.0, 0.0),
                    damage_radius_m: 12.0,
                    max_health: 100.0,
                },
                SubsystemConfig {
                    name: "sensors".into(),
                    position: DVec3::new(0.0, 40.0, 8.0),
                    damage_radius_m: 10.0,
                    max_health: 60.0,
                },
                SubsystemConfig {
                    name: "reactor".into(),
                    position: DVec3::ZERO,
                    damage_radius_m: 10.0,
                    max_health: 150.0,
                },
            ],
        }
    }
}
