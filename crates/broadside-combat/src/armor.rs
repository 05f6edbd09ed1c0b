//! Layered armor resistance.
//!
//! Damage passes through the armor layers outer to inner; each layer sees
//! only what penetrated the previous one. A layer's pass-through multiplier
//! combines its per-type resistance table, the event's piercing quality,
//! the angle of incidence, and the layer's remaining effectiveness and
//! integrity. A global per-damage-type effectiveness table sits on top:
//! armor never blocks EMP, and is disproportionately effective against
//! explosive and collision damage.

use std::collections::BTreeMap;

use broadside_core::config::ShipClassConfig;
use broadside_core::constants::*;
use broadside_core::enums::{ArmorLayerKind, DamageType, PenetrationMode};
use broadside_core::types::{ArmorResolution, DamageEvent, LayerHit};

/// Global armor effectiveness per damage type. Values above 1.0 are
/// intentional: plating over-performs against blast and blunt impact.
pub fn global_effectiveness(damage_type: DamageType) -> f64 {
    match damage_type {
        DamageType::Emp => ARMOR_EFFECTIVENESS_EMP,
        DamageType::Ion => ARMOR_EFFECTIVENESS_ION,
        DamageType::Explosive => ARMOR_EFFECTIVENESS_EXPLOSIVE,
        DamageType::Collision => ARMOR_EFFECTIVENESS_COLLISION,
        _ => 1.0,
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// One armor layer. Never destroyed outright; combat drives integrity
/// toward zero, at which point the layer behaves as if absent.
#[derive(Debug, Clone)]
pub struct ArmorLayer {
    pub kind: ArmorLayerKind,
    /// Pass-through multiplier per damage type (1.0 = no resistance).
    pub resistance: BTreeMap<DamageType, f64>,
    /// Design effectiveness in [0, 1].
    pub effectiveness: f64,
    /// Remaining integrity in [0, 1]. Degraded by combat, restored by repair.
    pub integrity: f64,
}

impl ArmorLayer {
    pub fn new(kind: ArmorLayerKind, resistance: BTreeMap<DamageType, f64>) -> Self {
        Self {
            kind,
            resistance,
            effectiveness: 1.0,
            integrity: 1.0,
        }
    }

    /// Fraction of incoming damage this layer absorbs for the given event,
    /// in [0, 1].
    fn absorbed_fraction(&self, event: &DamageEvent, angle_modeling: bool) -> f64 {
        let mut multiplier = self
            .resistance
            .get(&event.damage_type)
            .copied()
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);

        // Piercing moves effective resistance toward "no resistance".
        let piercing = event.armor_piercing.clamp(0.0, 1.0);
        if piercing > 0.0 {
            multiplier = lerp(multiplier, 1.0, piercing);
        }

        // Grazing hits are resisted more; the factor never drops below 0.1.
        if angle_modeling {
            let angle_factor = event.impact_angle_deg.to_radians().cos().max(ANGLE_FACTOR_MIN);
            multiplier *= angle_factor;
        }

        // A degraded layer fades toward full pass-through.
        let strength = (self.effectiveness * self.integrity).clamp(0.0, 1.0);
        multiplier = lerp(1.0, multiplier, strength);

        ((1.0 - multiplier) * global_effectiveness(event.damage_type)).clamp(0.0, 1.0)
    }
}

/// Resolves damage through the ordered layer stack.
#[derive(Debug, Clone)]
pub struct ArmorResistanceCalculator {
    layers: Vec<ArmorLayer>,
    /// Whether angle-of-incidence modeling is applied.
    pub angle_modeling: bool,
}

impl ArmorResistanceCalculator {
    /// Build from an explicit layer list (tests, exotic classes).
    pub fn new(layers: Vec<ArmorLayer>) -> Self {
        Self {
            layers,
            angle_modeling: true,
        }
    }

    /// Build the standard four-layer stack from a ship class config.
    /// Layers missing from the config get an empty table (no resistance).
    pub fn from_config(config: &ShipClassConfig) -> Self {
        let layers = ArmorLayerKind::ORDERED
            .iter()
            .map(|kind| match config.armor_layers.get(kind) {
                Some(cfg) => ArmorLayer {
                    kind: *kind,
                    resistance: cfg.resistance.clone(),
                    effectiveness: cfg.effectiveness.clamp(0.0, 1.0),
                    integrity: 1.0,
                },
                None => ArmorLayer::new(*kind, BTreeMap::new()),
            })
            .collect();
        Self::new(layers)
    }

    /// Resolve damage against the stack, outer to inner.
    pub fn resolve(&self, damage: f64, event: &DamageEvent) -> ArmorResolution {
        let damage = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
        let mut remaining = damage;
        let mut absorbed_total = 0.0;
        let mut affected = Vec::new();

        for layer in &self.layers {
            if remaining <= 0.0 {
                break;
            }
            let absorbed = remaining * layer.absorbed_fraction(event, self.angle_modeling);
            if absorbed > 0.0 {
                affected.push(LayerHit {
                    layer: layer.kind,
                    absorbed,
                });
                absorbed_total += absorbed;
                remaining -= absorbed;
            }
        }

        ArmorResolution {
            final_damage: remaining,
            damage_absorbed: absorbed_total,
            penetration_mode: classify_penetration(damage, absorbed_total),
            affected_layers: affected,
        }
    }

    /// Degrade a layer's integrity (clamped at zero).
    pub fn degrade(&mut self, kind: ArmorLayerKind, amount: f64) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.kind == kind) {
            layer.integrity = (layer.integrity - amount.max(0.0)).clamp(0.0, 1.0);
        }
    }

    /// Restore a layer's integrity (clamped at one).
    pub fn repair_layer(&mut self, kind: ArmorLayerKind, amount: f64) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.kind == kind) {
            layer.integrity = (layer.integrity + amount.max(0.0)).clamp(0.0, 1.0);
        }
    }

    pub fn layer(&self, kind: ArmorLayerKind) -> Option<&ArmorLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Classify how much of the input the stack absorbed.
fn classify_penetration(input: f64, absorbed: f64) -> PenetrationMode {
    if input <= 0.0 || absorbed <= 0.0 {
        return PenetrationMode::None;
    }
    let fraction = absorbed / input;
    if fraction > PENETRATION_PARTIAL_ABSORB {
        PenetrationMode::Partial
    } else if fraction >= PENETRATION_OVERPEN_ABSORB {
        PenetrationMode::Full
    } else {
        PenetrationMode::Overpenetration
    }
}
