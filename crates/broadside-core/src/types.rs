//! Damage event and result types exchanged across the pipeline boundary.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Weapon parameters attached to a damage event by the firing system.
/// Classification derives kinetic energy and blast falloff from these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponRef {
    /// Projectile mass in kilograms.
    pub mass_kg: f64,
    /// Impact speed in meters per second.
    pub speed_mps: f64,
    /// Blast radius for explosive warheads (meters, 0 = no blast).
    pub blast_radius_m: f64,
    /// Special weapons may skip the armor pass entirely.
    pub bypass_armor: bool,
}

/// An incoming damage event. Immutable input to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Raw damage amount. Must be positive; clamped to MAX_DAMAGE_PER_EVENT.
    pub amount: f64,
    /// What produced this event.
    pub source: DamageSource,
    /// How the damage interacts with armor and shields.
    pub damage_type: DamageType,
    /// Impact point in ship-local space (meters).
    pub impact_position: DVec3,
    /// Direction the damage arrived from, in ship frame.
    pub impact_direction: DVec3,
    /// Angle of incidence against the hull surface, degrees (0 = head-on).
    pub impact_angle_deg: f64,
    /// Armor piercing quality in [0, 1]. 1.0 ignores resistance entirely.
    pub armor_piercing: f64,
    /// Fraction of the damage that bypasses shields, in [0, 1].
    pub shield_piercing: f64,
    /// Distance from the blast center for explosions/shockwaves (meters).
    pub blast_distance: Option<f64>,
    /// Optional weapon parameters for classification.
    pub weapon: Option<WeaponRef>,
}

impl DamageEvent {
    /// A minimal event with the given amount, source and type.
    /// Impact geometry defaults to a head-on hit at the origin.
    pub fn new(amount: f64, source: DamageSource, damage_type: DamageType) -> Self {
        Self {
            amount,
            source,
            damage_type,
            impact_position: DVec3::ZERO,
            impact_direction: DVec3::NEG_Y,
            impact_angle_deg: 0.0,
            armor_piercing: 0.0,
            shield_piercing: 0.0,
            blast_distance: None,
            weapon: None,
        }
    }
}

/// A validated event augmented with source-specific derived fields.
/// Produced by `DamageProcessor::classify`; pure data, no side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    /// The validated (possibly truncated) source event.
    pub event: DamageEvent,
    /// Damage after source-specific derivation (kinetic energy, falloff).
    pub effective_amount: f64,
    /// Blast falloff factor applied, if any (1.0 = no falloff).
    pub falloff: f64,
    /// Whether the armor pass is skipped for this event.
    pub bypass_armor: bool,
}

/// Outcome of one armor layer pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerHit {
    pub layer: ArmorLayerKind,
    /// Damage absorbed by this layer.
    pub absorbed: f64,
}

/// Result of resolving damage against the layered armor stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorResolution {
    /// Damage remaining after all layers.
    pub final_damage: f64,
    /// Total damage absorbed across layers.
    pub damage_absorbed: f64,
    /// Overall penetration classification.
    pub penetration_mode: PenetrationMode,
    /// Layers that absorbed a nonzero amount, outer first.
    pub affected_layers: Vec<LayerHit>,
}

/// Report from a single hull damage application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HullReport {
    /// Damage actually applied to hull strength (after the hull armor pass).
    pub damage_applied: f64,
    /// Hull strength remaining.
    pub strength_remaining: f64,
    /// Hull state after this application.
    pub state: HullState,
    /// Whether this application started the destruction sequence.
    pub destruction_triggered: bool,
}

/// Aggregated outcome of processing one damage event through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Total damage dealt to shields plus hull.
    pub total_damage_dealt: f64,
    /// Damage absorbed by shields.
    pub shield_damage: f64,
    /// Damage applied to the hull.
    pub hull_damage: f64,
    /// Damage absorbed by the armor stack.
    pub armor_absorbed: f64,
    /// Parallel subsystem damage channel, by subsystem name.
    /// Not subtracted from hull damage.
    pub subsystem_damage: BTreeMap<String, f64>,
    /// Whether this event triggered the destruction sequence.
    pub destruction_triggered: bool,
}

/// The current three-pool power allocation (level indices into ENERGY_LEVELS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerAllocation {
    pub shields: u8,
    pub weapons: u8,
    pub engines: u8,
}

impl Default for PowerAllocation {
    fn default() -> Self {
        Self {
            shields: crate::constants::ETS_BALANCED_INDEX,
            weapons: crate::constants::ETS_BALANCED_INDEX,
            engines: crate::constants::ETS_BALANCED_INDEX,
        }
    }
}

impl PowerAllocation {
    /// Sum of the three power fractions this allocation selects.
    /// Out-of-range indices contribute zero rather than panic.
    pub fn fraction_sum(&self) -> f64 {
        let level = |index: u8| {
            crate::constants::ENERGY_LEVELS
                .get(index as usize)
                .copied()
                .unwrap_or(0.0)
        };
        level(self.shields) + level(self.weapons) + level(self.engines)
    }

    /// Whether this allocation satisfies the zero-sum invariant.
    pub fn is_balanced(&self) -> bool {
        let max = crate::constants::ETS_MAX_INDEX;
        self.shields <= max
            && self.weapons <= max
            && self.engines <= max
            && (self.fraction_sum() - 1.0).abs() <= crate::constants::ETS_SUM_TOLERANCE
    }
}
