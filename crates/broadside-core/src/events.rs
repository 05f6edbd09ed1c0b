//! Notification events emitted by the simulation for external observers
//! (UI, VFX, AI, scoring). Emission is fire-and-forget; no event carries
//! a synchronous response.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Typed notifications produced by the combat pipeline and the ETS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A shield quadrant absorbed damage.
    ShieldAbsorbed {
        quadrant: ShieldQuadrant,
        amount: f64,
        remaining_strength: f64,
    },
    /// The armor stack deflected part of an event.
    ArmorDeflected {
        absorbed: f64,
        penetration: PenetrationMode,
    },
    /// Damage reached the hull.
    HullDamaged {
        amount: f64,
        strength_remaining: f64,
        state: HullState,
    },
    /// The hull crossed a state threshold.
    HullStateChanged { from: HullState, to: HullState },
    /// A subsystem took damage from the parallel channel.
    SubsystemDamaged { name: String, amount: f64 },
    /// Hull strength reached zero; the destruction timer is running.
    DestructionStarted { destruction: DestructionType },
    /// The destruction delay elapsed; the ship is finalized as destroyed.
    ShipDestroyed { destruction: DestructionType },
    /// The ETS allocation changed via transfer or direct set.
    PowerAllocationChanged {
        shields: u8,
        weapons: u8,
        engines: u8,
    },
    /// The combined power efficiency multiplier changed.
    PowerEfficiencyChanged { efficiency: f64 },
    /// The ship-wide power status crossed a threshold.
    EmergencyPowerChanged {
        from: EmergencyPowerState,
        to: EmergencyPowerState,
    },
}

/// Discriminant used for subscription filtering on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEventKind {
    ShieldAbsorbed,
    ArmorDeflected,
    HullDamaged,
    HullStateChanged,
    SubsystemDamaged,
    DestructionStarted,
    ShipDestroyed,
    PowerAllocationChanged,
    PowerEfficiencyChanged,
    EmergencyPowerChanged,
}

impl CombatEvent {
    /// The subscription kind of this event.
    pub fn kind(&self) -> CombatEventKind {
        match self {
            CombatEvent::ShieldAbsorbed { .. } => CombatEventKind::ShieldAbsorbed,
            CombatEvent::ArmorDeflected { .. } => CombatEventKind::ArmorDeflected,
            CombatEvent::HullDamaged { .. } => CombatEventKind::HullDamaged,
            CombatEvent::HullStateChanged { .. } => CombatEventKind::HullStateChanged,
            CombatEvent::SubsystemDamaged { .. } => CombatEventKind::SubsystemDamaged,
            CombatEvent::DestructionStarted { .. } => CombatEventKind::DestructionStarted,
            CombatEvent::ShipDestroyed { .. } => CombatEventKind::ShipDestroyed,
            CombatEvent::PowerAllocationChanged { .. } => CombatEventKind::PowerAllocationChanged,
            CombatEvent::PowerEfficiencyChanged { .. } => CombatEventKind::PowerEfficiencyChanged,
            CombatEvent::EmergencyPowerChanged { .. } => CombatEventKind::EmergencyPowerChanged,
        }
    }
}
