//! Subsystem damage distribution.
//!
//! A fixed fraction of each event is routed to subsystems near the impact
//! point, weighted by proximity. This is a parallel channel: it draws from
//! the same event but is not subtracted from hull damage.

use std::collections::BTreeMap;

use broadside_core::config::ShipClassConfig;
use broadside_core::constants::SUBSYSTEM_DAMAGE_FRACTION;
use broadside_core::events::CombatEvent;
use broadside_core::types::DamageEvent;

use crate::bus::CombatBus;

#[derive(Debug, Clone)]
pub struct Subsystem {
    pub name: String,
    pub position: glam::DVec3,
    pub damage_radius_m: f64,
    pub health: f64,
    pub max_health: f64,
}

impl Subsystem {
    /// Remaining health fraction in [0, 1].
    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubsystemDamageDistributor {
    subsystems: Vec<Subsystem>,
}

impl SubsystemDamageDistributor {
    pub fn from_config(config: &ShipClassConfig) -> Self {
        let subsystems = config
            .subsystems
            .iter()
            .map(|cfg| Subsystem {
                name: cfg.name.clone(),
                position: cfg.position,
                damage_radius_m: cfg.damage_radius_m,
                health: cfg.max_health,
                max_health: cfg.max_health,
            })
            .collect();
        Self { subsystems }
    }

    /// Route the subsystem fraction of `amount` to subsystems within their
    /// damage radius of the impact point. Returns damage per subsystem name.
    pub fn distribute(
        &mut self,
        event: &DamageEvent,
        amount: f64,
        bus: &mut CombatBus,
    ) -> BTreeMap<String, f64> {
        let mut dealt = BTreeMap::new();
        let budget = amount.max(0.0) * SUBSYSTEM_DAMAGE_FRACTION;
        if budget <= 0.0 {
            return dealt;
        }

        // Proximity weights: 1.0 at the impact point, 0.0 at the radius edge.
        let mut weights = Vec::new();
        let mut total_weight = 0.0;
        for (idx, sub) in self.subsystems.iter().enumerate() {
            if sub.health <= 0.0 {
                continue;
            }
            let distance = (sub.position - event.impact_position).length();
            if distance >= sub.damage_radius_m {
                continue;
            }
            let weight = 1.0 - distance / sub.damage_radius_m;
            weights.push((idx, weight));
            total_weight += weight;
        }
        if total_weight <= 0.0 {
            return dealt;
        }

        for (idx, weight) in weights {
            let sub = &mut self.subsystems[idx];
            let share = budget * weight / total_weight;
            let applied = share.min(sub.health);
            if applied <= 0.0 {
                continue;
            }
            sub.health -= applied;
            bus.emit(CombatEvent::SubsystemDamaged {
                name: sub.name.clone(),
                amount: applied,
            });
            dealt.insert(sub.name.clone(), applied);
        }
        dealt
    }

    pub fn get(&self, name: &str) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.name == name)
    }

    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }
}
