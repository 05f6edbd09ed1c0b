//! Per-ship combat aggregate.
//!
//! A `Ship` exclusively owns its damage pipeline, ETS, and event bus; no
//! state crosses ship boundaries. The host simulation loop feeds it damage
//! events and calls `tick` once per frame from a single thread.

use broadside_core::config::{ConfigError, ShipClassConfig};
use broadside_core::constants::{ENERGY_LEVELS, SHIELD_RECHARGE_RATE};
use broadside_core::enums::{EnergyPool, PowerTransfer};
use broadside_core::events::{CombatEvent, CombatEventKind};
use broadside_core::types::{DamageEvent, DamageResult, PowerAllocation};

use crate::bus::{CombatBus, Handler};
use crate::ets::EtsManager;
use crate::processor::DamageProcessor;

pub struct Ship {
    processor: DamageProcessor,
    ets: EtsManager,
    bus: CombatBus,
}

impl Ship {
    /// Build a ship from class configuration. The only fallible call in
    /// the library: everything downstream clamps or no-ops.
    pub fn new(config: &ShipClassConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            processor: DamageProcessor::from_config(config),
            ets: EtsManager::from_config(config),
            bus: CombatBus::new(),
        })
    }

    /// Process one damage event through the pipeline.
    pub fn apply_damage(&mut self, event: &DamageEvent) -> DamageResult {
        self.processor.process(event, &mut self.bus)
    }

    /// Advance one simulation tick: ETS regeneration first, then shield
    /// recharge drawing real energy from the shield pool, then the hull
    /// destruction timer.
    pub fn tick(&mut self, delta: f64) {
        if delta <= 0.0 {
            return;
        }

        // Subsystem health gates pool regeneration.
        self.sync_subsystem_modifiers();
        self.ets.tick(delta, &mut self.bus);

        let rate = SHIELD_RECHARGE_RATE
            * ENERGY_LEVELS[self.ets.allocation().shields as usize]
            * delta;
        let want = self.processor.shields().deficit().min(rate);
        if want > 0.0 && self.ets.consume(EnergyPool::Shields, want) {
            self.processor.shields_mut().recharge(want);
        }

        self.processor.hull_mut().tick(delta, &mut self.bus);
    }

    /// Map subsystem health onto per-pool ETS modifiers: engines gate the
    /// engine pool, weapons the weapon pool, the reactor the shield pool.
    fn sync_subsystem_modifiers(&mut self) {
        let pairs = [
            ("engines", EnergyPool::Engines),
            ("weapons", EnergyPool::Weapons),
            ("reactor", EnergyPool::Shields),
        ];
        for (name, pool) in pairs {
            if let Some(sub) = self.processor.subsystems().get(name) {
                self.ets.set_subsystem_modifier(pool, sub.health_fraction());
            }
        }
    }

    pub fn transfer_power(&mut self, transfer: PowerTransfer) -> bool {
        self.ets.transfer(transfer, &mut self.bus)
    }

    pub fn set_power_allocation(&mut self, shields: u8, weapons: u8, engines: u8) -> bool {
        self.ets.set_allocation(shields, weapons, engines, &mut self.bus)
    }

    pub fn consume_energy(&mut self, pool: EnergyPool, amount: f64) -> bool {
        self.ets.consume(pool, amount)
    }

    pub fn apply_emp(&mut self, multiplier: f64, duration_secs: f64) {
        self.ets.apply_emp(multiplier, duration_secs, &mut self.bus);
    }

    /// Repair hull strength. Returns the amount actually repaired.
    pub fn repair_hull(&mut self, amount: f64) -> f64 {
        self.processor.hull_mut().repair(amount, &mut self.bus)
    }

    /// Begin a deliberate self-destruct sequence.
    pub fn scuttle(&mut self) {
        self.processor.hull_mut().scuttle(&mut self.bus);
    }

    pub fn subscribe(&mut self, kind: CombatEventKind, handler: Handler) {
        self.bus.subscribe(kind, handler);
    }

    pub fn subscribe_all(&mut self, handler: Handler) {
        self.bus.subscribe_all(handler);
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.bus.drain()
    }

    pub fn power_allocation(&self) -> PowerAllocation {
        self.ets.allocation()
    }

    pub fn is_destroyed(&self) -> bool {
        self.processor.hull().is_dead()
    }

    pub fn processor(&self) -> &DamageProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut DamageProcessor {
        &mut self.processor
    }

    pub fn ets(&self) -> &EtsManager {
        &self.ets
    }
}
