//! Energy Transfer System — the discrete 13-level tri-pool power allocator.
//!
//! Three energy pools (shields, weapons, engines) regenerate according to
//! their allocated power fraction, per-pool subsystem-damage modifiers, and
//! a time-interpolated EMP penalty. The allocation is zero-sum: the three
//! selected fractions always total 1.0 within tolerance.

use broadside_core::config::ShipClassConfig;
use broadside_core::constants::*;
use broadside_core::enums::{EmergencyPowerState, EnergyPool, PowerTransfer};
use broadside_core::events::CombatEvent;
use broadside_core::types::PowerAllocation;
use tracing::warn;

use crate::bus::CombatBus;

/// One energy pool.
#[derive(Debug, Clone, Copy)]
struct Pool {
    current: f64,
    max: f64,
    base_regen_rate: f64,
    /// Externally-driven damage modifier in [0, 1].
    subsystem_modifier: f64,
}

impl Pool {
    fn new(max: f64, base_regen_rate: f64) -> Self {
        Self {
            current: max,
            max,
            base_regen_rate,
            subsystem_modifier: 1.0,
        }
    }
}

/// Timed EMP penalty: starts at a reduced multiplier and recovers linearly
/// to 1.0 over the duration.
#[derive(Debug, Clone, Copy)]
struct EmpRamp {
    start_value: f64,
    elapsed_secs: f64,
    duration_secs: f64,
}

impl EmpRamp {
    fn value(&self) -> f64 {
        let t = (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0);
        self.start_value + (1.0 - self.start_value) * t
    }
}

pub struct EtsManager {
    allocation: PowerAllocation,
    shields: Pool,
    weapons: Pool,
    engines: Pool,
    emp: Option<EmpRamp>,
    emergency: EmergencyPowerState,
    last_efficiency: f64,
}

impl EtsManager {
    pub fn from_config(config: &ShipClassConfig) -> Self {
        Self {
            allocation: PowerAllocation::default(),
            shields: Pool::new(config.shield_pool.max_energy, config.shield_pool.base_regen_rate),
            weapons: Pool::new(config.weapon_pool.max_energy, config.weapon_pool.base_regen_rate),
            engines: Pool::new(config.engine_pool.max_energy, config.engine_pool.base_regen_rate),
            emp: None,
            emergency: EmergencyPowerState::Normal,
            last_efficiency: 1.0,
        }
    }

    /// Apply a discrete transfer gesture. Returns false (no mutation) if the
    /// move would leave the 13-level table.
    pub fn transfer(&mut self, transfer: PowerTransfer, bus: &mut CombatBus) -> bool {
        let next = match transfer {
            PowerTransfer::WeaponsToShields => {
                shift(self.allocation, EnergyPool::Weapons, EnergyPool::Shields)
            }
            PowerTransfer::ShieldsToWeapons => {
                shift(self.allocation, EnergyPool::Shields, EnergyPool::Weapons)
            }
            PowerTransfer::WeaponsToEngines => {
                shift(self.allocation, EnergyPool::Weapons, EnergyPool::Engines)
            }
            PowerTransfer::BalanceAll => {
                let balanced = PowerAllocation::default();
                if self.allocation == balanced {
                    // Already balanced; success without a notification.
                    return true;
                }
                Some(balanced)
            }
        };

        let Some(next) = next else { return false };
        debug_assert!(next.is_balanced());
        self.allocation = next;
        bus.emit(CombatEvent::PowerAllocationChanged {
            shields: next.shields,
            weapons: next.weapons,
            engines: next.engines,
        });
        true
    }

    /// Direct-set API for AI/automation. Rejects (no mutation) when index
    /// bounds or the zero-sum constraint fail.
    pub fn set_allocation(
        &mut self,
        shields: u8,
        weapons: u8,
        engines: u8,
        bus: &mut CombatBus,
    ) -> bool {
        let next = PowerAllocation {
            shields,
            weapons,
            engines,
        };
        if !next.is_balanced() {
            warn!(
                shields,
                weapons,
                engines,
                sum = next.fraction_sum(),
                "rejected power allocation: zero-sum constraint violated"
            );
            return false;
        }
        if next != self.allocation {
            self.allocation = next;
            bus.emit(CombatEvent::PowerAllocationChanged {
                shields,
                weapons,
                engines,
            });
        }
        true
    }

    /// Advance regeneration, the EMP ramp, and the emergency power state.
    pub fn tick(&mut self, delta: f64, bus: &mut CombatBus) {
        if delta <= 0.0 {
            return;
        }

        if let Some(ramp) = &mut self.emp {
            ramp.elapsed_secs += delta;
            if ramp.elapsed_secs >= ramp.duration_secs {
                self.emp = None;
            }
        }
        let emp = self.emp_multiplier();

        let alloc = self.allocation;
        for (pool, index) in [
            (&mut self.shields, alloc.shields),
            (&mut self.weapons, alloc.weapons),
            (&mut self.engines, alloc.engines),
        ] {
            let regen = pool.base_regen_rate
                * ENERGY_LEVELS[index as usize]
                * pool.subsystem_modifier.clamp(0.0, 1.0)
                * emp
                * delta;
            pool.current = (pool.current + regen).clamp(0.0, pool.max);
        }

        let efficiency = self.power_efficiency();
        if (efficiency - self.last_efficiency).abs() > 1e-9 {
            self.last_efficiency = efficiency;
            bus.emit(CombatEvent::PowerEfficiencyChanged { efficiency });
        }

        let state = self.emergency_for_energy();
        if state != self.emergency {
            bus.emit(CombatEvent::EmergencyPowerChanged {
                from: self.emergency,
                to: state,
            });
            self.emergency = state;
        }
    }

    /// Atomic check-then-subtract. Fails without mutation if the pool holds
    /// less than `amount`.
    pub fn consume(&mut self, pool: EnergyPool, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            return false;
        }
        let pool = self.pool_mut(pool);
        if amount > pool.current {
            return false;
        }
        pool.current -= amount;
        true
    }

    /// Apply an EMP efficiency penalty that recovers linearly to 1.0 over
    /// `duration_secs`. A stronger (lower) multiplier replaces a weaker
    /// active ramp.
    pub fn apply_emp(&mut self, multiplier: f64, duration_secs: f64, bus: &mut CombatBus) {
        let start_value = multiplier.clamp(0.0, 1.0);
        if let Some(active) = &self.emp {
            if active.value() <= start_value {
                return;
            }
        }
        self.emp = Some(EmpRamp {
            start_value,
            elapsed_secs: 0.0,
            duration_secs: duration_secs.max(f64::EPSILON),
        });
        let efficiency = self.power_efficiency();
        self.last_efficiency = efficiency;
        bus.emit(CombatEvent::PowerEfficiencyChanged { efficiency });
    }

    /// Externally-driven per-pool damage modifier, clamped to [0, 1].
    pub fn set_subsystem_modifier(&mut self, pool: EnergyPool, modifier: f64) {
        self.pool_mut(pool).subsystem_modifier = modifier.clamp(0.0, 1.0);
    }

    /// Current EMP multiplier (1.0 when no ramp is active).
    pub fn emp_multiplier(&self) -> f64 {
        self.emp.map_or(1.0, |ramp| ramp.value())
    }

    /// Product of the per-pool subsystem modifiers and the EMP multiplier.
    pub fn power_efficiency(&self) -> f64 {
        (self.shields.subsystem_modifier
            * self.weapons.subsystem_modifier
            * self.engines.subsystem_modifier
            * self.emp_multiplier())
        .clamp(0.0, 1.0)
    }

    pub fn allocation(&self) -> PowerAllocation {
        self.allocation
    }

    pub fn energy(&self, pool: EnergyPool) -> f64 {
        self.pool(pool).current
    }

    pub fn max_energy(&self, pool: EnergyPool) -> f64 {
        self.pool(pool).max
    }

    pub fn emergency_state(&self) -> EmergencyPowerState {
        self.emergency
    }

    fn emergency_for_energy(&self) -> EmergencyPowerState {
        let total = self.shields.current + self.weapons.current + self.engines.current;
        let max = self.shields.max + self.weapons.max + self.engines.max;
        let pct = if max > 0.0 { total / max } else { 0.0 };
        if pct > POWER_NORMAL_PCT {
            EmergencyPowerState::Normal
        } else if pct > POWER_LOW_PCT {
            EmergencyPowerState::LowPower
        } else if pct > POWER_CRITICAL_PCT {
            EmergencyPowerState::CriticalPower
        } else {
            EmergencyPowerState::EmergencyPower
        }
    }

    fn pool(&self, pool: EnergyPool) -> &Pool {
        match pool {
            EnergyPool::Shields => &self.shields,
            EnergyPool::Weapons => &self.weapons,
            EnergyPool::Engines => &self.engines,
        }
    }

    fn pool_mut(&mut self, pool: EnergyPool) -> &mut Pool {
        match pool {
            EnergyPool::Shields => &mut self.shields,
            EnergyPool::Weapons => &mut self.weapons,
            EnergyPool::Engines => &mut self.engines,
        }
    }
}

fn level_of(allocation: &PowerAllocation, pool: EnergyPool) -> u8 {
    match pool {
        EnergyPool::Shields => allocation.shields,
        EnergyPool::Weapons => allocation.weapons,
        EnergyPool::Engines => allocation.engines,
    }
}

fn set_level(allocation: &mut PowerAllocation, pool: EnergyPool, level: u8) {
    match pool {
        EnergyPool::Shields => allocation.shields = level,
        EnergyPool::Weapons => allocation.weapons = level,
        EnergyPool::Engines => allocation.engines = level,
    }
}

/// Move one level between two pools of a candidate allocation. Returns None
/// when the source is at the floor or the destination at the ceiling.
fn shift(
    mut allocation: PowerAllocation,
    src: EnergyPool,
    dst: EnergyPool,
) -> Option<PowerAllocation> {
    let src_level = level_of(&allocation, src);
    let dst_level = level_of(&allocation, dst);
    if src_level == 0 || dst_level >= ETS_MAX_INDEX {
        return None;
    }
    set_level(&mut allocation, src, src_level - 1);
    set_level(&mut allocation, dst, dst_level + 1);
    Some(allocation)
}
