//! Hull integrity, state machine, and the destruction sequence.
//!
//! The hull carries its own armor profile, applied as a second resistance
//! pass independent of the layered calculator. Hull strength only moves
//! down under damage and up under explicit repair. Destruction is announced
//! when strength reaches zero and finalized after a tick-accumulated delay.

use std::collections::BTreeMap;

use broadside_core::config::ShipClassConfig;
use broadside_core::constants::*;
use broadside_core::enums::{DamageSource, DamageType, DestructionType, HullState};
use broadside_core::events::CombatEvent;
use broadside_core::types::{DamageEvent, HullReport};

use crate::armor::global_effectiveness;
use crate::bus::CombatBus;

/// Running destruction sequence.
#[derive(Debug, Clone, Copy)]
struct Destruction {
    kind: DestructionType,
    timer_secs: f64,
    delay_secs: f64,
}

#[derive(Debug, Clone)]
pub struct HullDamageSystem {
    max_strength: f64,
    strength: f64,
    state: HullState,
    /// Hull pass-through multiplier per damage type.
    armor: BTreeMap<DamageType, f64>,
    destruction: Option<Destruction>,
    dead: bool,
}

impl HullDamageSystem {
    pub fn from_config(config: &ShipClassConfig) -> Self {
        Self {
            max_strength: config.max_hull_strength,
            strength: config.max_hull_strength,
            state: HullState::Intact,
            armor: config.hull_armor.clone(),
            destruction: None,
            dead: false,
        }
    }

    /// Hull-specific pass-through multiplier for an event. Shares the
    /// global per-type effectiveness table with the layered calculator.
    fn pass_through(&self, event: &DamageEvent) -> f64 {
        let mut multiplier = self
            .armor
            .get(&event.damage_type)
            .copied()
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);
        let piercing = event.armor_piercing.clamp(0.0, 1.0);
        if piercing > 0.0 {
            multiplier += (1.0 - multiplier) * piercing;
        }
        let absorbed = ((1.0 - multiplier) * global_effectiveness(event.damage_type)).clamp(0.0, 1.0);
        1.0 - absorbed
    }

    /// Apply post-armor damage to the hull.
    pub fn apply(&mut self, damage: f64, event: &DamageEvent, bus: &mut CombatBus) -> HullReport {
        let mut report = HullReport {
            damage_applied: 0.0,
            strength_remaining: self.strength,
            state: self.state,
            destruction_triggered: false,
        };

        if !damage.is_finite() || damage <= MIN_DAMAGE_THRESHOLD || self.destruction.is_some() {
            return report;
        }

        let applied = damage * self.pass_through(event);
        if applied <= 0.0 {
            return report;
        }

        self.strength = (self.strength - applied).max(0.0);
        report.damage_applied = applied;
        report.strength_remaining = self.strength;

        let new_state = self.state_for_strength();
        bus.emit(CombatEvent::HullDamaged {
            amount: applied,
            strength_remaining: self.strength,
            state: new_state,
        });
        if new_state != self.state {
            bus.emit(CombatEvent::HullStateChanged {
                from: self.state,
                to: new_state,
            });
            self.state = new_state;
        }
        report.state = self.state;

        if self.strength <= 0.0 {
            let kind = select_destruction(applied, self.max_strength, event);
            self.begin_destruction(kind, bus);
            report.destruction_triggered = true;
        }

        report
    }

    /// Advance the destruction timer. Finalizes once the delay elapses.
    pub fn tick(&mut self, delta: f64, bus: &mut CombatBus) {
        if self.dead || delta <= 0.0 {
            return;
        }
        if let Some(destruction) = &mut self.destruction {
            destruction.timer_secs += delta;
            if destruction.timer_secs >= destruction.delay_secs {
                self.dead = true;
                bus.emit(CombatEvent::ShipDestroyed {
                    destruction: destruction.kind,
                });
            }
        }
    }

    /// Restore hull strength. No-op while destruction is in progress.
    /// Returns the amount actually repaired.
    pub fn repair(&mut self, amount: f64, bus: &mut CombatBus) -> f64 {
        if self.destruction.is_some() || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.max_strength - self.strength);
        self.strength += actual;
        let new_state = self.state_for_strength();
        if new_state != self.state {
            bus.emit(CombatEvent::HullStateChanged {
                from: self.state,
                to: new_state,
            });
            self.state = new_state;
        }
        actual
    }

    /// Deliberate self-destruct: zeroes the hull and starts a Scuttled
    /// destruction sequence. No-op if destruction is already in progress.
    pub fn scuttle(&mut self, bus: &mut CombatBus) {
        if self.destruction.is_some() {
            return;
        }
        self.strength = 0.0;
        let previous = self.state;
        self.state = HullState::Destroyed;
        if previous != self.state {
            bus.emit(CombatEvent::HullStateChanged {
                from: previous,
                to: self.state,
            });
        }
        self.begin_destruction(DestructionType::Scuttled, bus);
    }

    fn begin_destruction(&mut self, kind: DestructionType, bus: &mut CombatBus) {
        self.destruction = Some(Destruction {
            kind,
            timer_secs: 0.0,
            delay_secs: DESTRUCTION_DELAY_SECS,
        });
        bus.emit(CombatEvent::DestructionStarted { destruction: kind });
    }

    fn state_for_strength(&self) -> HullState {
        let pct = self.strength / self.max_strength;
        if pct > HULL_INTACT_PCT {
            HullState::Intact
        } else if pct > HULL_DAMAGED_PCT {
            HullState::Damaged
        } else if pct > HULL_CRITICAL_PCT {
            HullState::Critical
        } else if pct > 0.0 {
            HullState::Failing
        } else {
            HullState::Destroyed
        }
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn max_strength(&self) -> f64 {
        self.max_strength
    }

    pub fn state(&self) -> HullState {
        self.state
    }

    pub fn destruction_in_progress(&self) -> bool {
        self.destruction.is_some() && !self.dead
    }

    pub fn destruction_type(&self) -> Option<DestructionType> {
        self.destruction.map(|d| d.kind)
    }

    /// Whether the destruction delay has elapsed and the ship is finalized.
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

/// Pick the destruction type from the triggering event, by priority.
fn select_destruction(applied: f64, max_hull: f64, event: &DamageEvent) -> DestructionType {
    if applied > max_hull * CATASTROPHIC_DAMAGE_FRACTION {
        DestructionType::Catastrophic
    } else if event.damage_type == DamageType::Explosive {
        DestructionType::Explosive
    } else if event.source == DamageSource::Collision {
        DestructionType::Structural
    } else {
        DestructionType::Normal
    }
}
