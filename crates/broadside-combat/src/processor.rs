//! Damage processor — validates, classifies, and sequences damage events
//! through shields, armor, hull, and subsystems.
//!
//! The processor exclusively owns its sub-components; there is no shared
//! state between ships. A single malformed event never halts a combat
//! tick: bad input degrades to a dropped event or a clamped value.

use broadside_core::config::ShipClassConfig;
use broadside_core::constants::*;
use broadside_core::enums::DamageSource;
use broadside_core::events::CombatEvent;
use broadside_core::types::{ClassifiedEvent, DamageEvent, DamageResult};
use tracing::{debug, warn};

use crate::armor::ArmorResistanceCalculator;
use crate::bus::CombatBus;
use crate::hull::HullDamageSystem;
use crate::shields::ShieldQuadrantManager;
use crate::subsystems::SubsystemDamageDistributor;

pub struct DamageProcessor {
    shields: ShieldQuadrantManager,
    armor: ArmorResistanceCalculator,
    hull: HullDamageSystem,
    subsystems: SubsystemDamageDistributor,
}

impl DamageProcessor {
    pub fn from_config(config: &ShipClassConfig) -> Self {
        Self {
            shields: ShieldQuadrantManager::new(config.shield_quadrant_strength),
            armor: ArmorResistanceCalculator::from_config(config),
            hull: HullDamageSystem::from_config(config),
            subsystems: SubsystemDamageDistributor::from_config(config),
        }
    }

    /// Validate an incoming event. Returns a sanitized copy, or None when
    /// the event is dropped (sub-threshold, malformed, or the target ship
    /// is already destroyed). Dropping is silent by design; only truncation
    /// of over-max damage is logged.
    pub fn validate(&self, event: &DamageEvent) -> Option<DamageEvent> {
        if self.hull.is_dead() || self.hull.destruction_in_progress() {
            return None;
        }
        if !event.amount.is_finite()
            || !event.impact_angle_deg.is_finite()
            || !event.impact_position.is_finite()
            || !event.impact_direction.is_finite()
        {
            debug!(source = ?event.source, "dropped malformed damage event");
            return None;
        }
        if event.amount < MIN_DAMAGE_THRESHOLD {
            return None;
        }

        let mut sanitized = event.clone();
        if sanitized.amount > MAX_DAMAGE_PER_EVENT {
            warn!(
                amount = sanitized.amount,
                cap = MAX_DAMAGE_PER_EVENT,
                "damage event truncated to cap"
            );
            sanitized.amount = MAX_DAMAGE_PER_EVENT;
        }
        sanitized.armor_piercing = sanitized.armor_piercing.clamp(0.0, 1.0);
        sanitized.shield_piercing = sanitized.shield_piercing.clamp(0.0, 1.0);
        Some(sanitized)
    }

    /// Augment a validated event with source-specific derived fields.
    /// Pure and side-effect-free.
    pub fn classify(&self, event: &DamageEvent) -> ClassifiedEvent {
        let mut effective_amount = event.amount;
        let mut falloff = 1.0;
        let mut bypass_armor = false;

        match event.source {
            // Kinetic energy of the impactor when parameters are known.
            // Collision reporters pre-compute the reduced mass of the pair
            // and supply it as mass_kg with the relative closing speed.
            DamageSource::Projectile | DamageSource::Collision | DamageSource::Ramming => {
                if let Some(weapon) = &event.weapon {
                    if weapon.mass_kg > 0.0 && weapon.speed_mps > 0.0 {
                        effective_amount =
                            0.5 * weapon.mass_kg * weapon.speed_mps * weapon.speed_mps;
                    }
                }
            }
            // Linear blast falloff from the detonation point.
            DamageSource::Explosion | DamageSource::Shockwave => {
                let radius = event.weapon.map_or(0.0, |w| w.blast_radius_m);
                if let (Some(distance), true) = (event.blast_distance, radius > 0.0) {
                    falloff = (1.0 - distance / radius).clamp(0.0, 1.0);
                    effective_amount = event.amount * falloff;
                }
            }
            DamageSource::SpecialWeapon => {
                bypass_armor = event.weapon.map_or(false, |w| w.bypass_armor);
            }
            DamageSource::Beam
            | DamageSource::Environmental
            | DamageSource::SubsystemOverload
            | DamageSource::Debug => {}
        }

        ClassifiedEvent {
            event: event.clone(),
            effective_amount: effective_amount.min(MAX_DAMAGE_PER_EVENT),
            falloff,
            bypass_armor,
        }
    }

    /// Run the full pipeline for one event:
    /// shields -> armor -> hull, with subsystems as a parallel channel.
    ///
    /// Subsystem damage draws from the same post-shield amount but is NOT
    /// subtracted from hull damage. This dual-channel model matches the
    /// source behavior and is a deliberate design choice, not a bug.
    pub fn process(&mut self, event: &DamageEvent, bus: &mut CombatBus) -> DamageResult {
        let Some(event) = self.validate(event) else {
            return DamageResult::default();
        };
        let classified = self.classify(&event);
        let amount = classified.effective_amount;
        if amount < MIN_DAMAGE_THRESHOLD {
            return DamageResult::default();
        }

        let absorption = self.shields.process(amount, &event);
        if absorption.absorbed > 0.0 {
            bus.emit(CombatEvent::ShieldAbsorbed {
                quadrant: absorption.quadrant,
                amount: absorption.absorbed,
                remaining_strength: self.shields.quadrant_strength(absorption.quadrant),
            });
        }
        let past_shields = amount - absorption.absorbed;

        let resolution = if classified.bypass_armor {
            broadside_core::types::ArmorResolution {
                final_damage: past_shields,
                ..Default::default()
            }
        } else {
            self.armor.resolve(past_shields, &event)
        };
        if resolution.damage_absorbed > 0.0 {
            bus.emit(CombatEvent::ArmorDeflected {
                absorbed: resolution.damage_absorbed,
                penetration: resolution.penetration_mode,
            });
        }

        let hull_report = self.hull.apply(resolution.final_damage, &event, bus);
        let subsystem_damage = self.subsystems.distribute(&event, past_shields, bus);

        DamageResult {
            total_damage_dealt: absorption.absorbed + hull_report.damage_applied,
            shield_damage: absorption.absorbed,
            hull_damage: hull_report.damage_applied,
            armor_absorbed: resolution.damage_absorbed,
            subsystem_damage,
            destruction_triggered: hull_report.destruction_triggered,
        }
    }

    pub fn shields(&self) -> &ShieldQuadrantManager {
        &self.shields
    }

    pub fn shields_mut(&mut self) -> &mut ShieldQuadrantManager {
        &mut self.shields
    }

    pub fn armor(&self) -> &ArmorResistanceCalculator {
        &self.armor
    }

    pub fn armor_mut(&mut self) -> &mut ArmorResistanceCalculator {
        &mut self.armor
    }

    pub fn hull(&self) -> &HullDamageSystem {
        &self.hull
    }

    pub fn hull_mut(&mut self) -> &mut HullDamageSystem {
        &mut self.hull
    }

    pub fn subsystems(&self) -> &SubsystemDamageDistributor {
        &self.subsystems
    }
}
