//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// What produced a damage event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// Solid projectile (mass driver round, flak).
    #[default]
    Projectile,
    /// Continuous beam weapon.
    Beam,
    /// Ship-to-ship or ship-to-debris collision.
    Collision,
    /// Warhead or ordnance detonation with a blast radius.
    Explosion,
    /// Propagating shockwave from a nearby detonation.
    Shockwave,
    /// Environmental hazard (asteroid field, radiation belt).
    Environmental,
    /// Deliberate ramming attack.
    Ramming,
    /// Internal subsystem overload.
    SubsystemOverload,
    /// Special weapon with scripted behavior (may bypass armor).
    SpecialWeapon,
    /// Debug/console-applied damage.
    Debug,
}

/// How a damage event interacts with armor and shields.
/// Ordered so resistance tables can live in `BTreeMap`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Kinetic impact (projectiles).
    #[default]
    Kinetic,
    /// Generic directed energy.
    Energy,
    /// Plasma discharge.
    Plasma,
    /// Explosive blast.
    Explosive,
    /// Electromagnetic pulse. Armor never blocks this.
    Emp,
    /// Ion discharge (disables more than it destroys).
    Ion,
    /// Beam weapon damage.
    Beam,
    /// Armor-piercing munitions.
    Piercing,
    /// Blast shockwave.
    Shockwave,
    /// Collision/ramming impact.
    Collision,
}

impl DamageType {
    /// All damage types, for building resistance tables.
    pub const ALL: [DamageType; 10] = [
        DamageType::Kinetic,
        DamageType::Energy,
        DamageType::Plasma,
        DamageType::Explosive,
        DamageType::Emp,
        DamageType::Ion,
        DamageType::Beam,
        DamageType::Piercing,
        DamageType::Shockwave,
        DamageType::Collision,
    ];
}

/// Ordered armor layers, processed outer to inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArmorLayerKind {
    /// Outermost ablative plating.
    Outer,
    /// Primary structural armor belt.
    Main,
    /// Inner compartment armor.
    Inner,
    /// Dedicated subsystem shrouds.
    Subsystem,
}

impl ArmorLayerKind {
    /// Layers in processing order (outer first).
    pub const ORDERED: [ArmorLayerKind; 4] = [
        ArmorLayerKind::Outer,
        ArmorLayerKind::Main,
        ArmorLayerKind::Inner,
        ArmorLayerKind::Subsystem,
    ];
}

/// Hull integrity state. Moves down under damage, up only via repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HullState {
    /// Above 75% integrity.
    #[default]
    Intact,
    /// 50-75% integrity.
    Damaged,
    /// 25-50% integrity.
    Critical,
    /// Below 25%, still holding together.
    Failing,
    /// Hull strength reached zero.
    Destroyed,
}

/// How a ship dies. Selected once, when hull strength reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructionType {
    /// Ordinary hull failure.
    Normal,
    /// Killed by explosive damage.
    Explosive,
    /// Broken apart by collision.
    Structural,
    /// Single overwhelming hit (more than half of max hull).
    Catastrophic,
    /// Deliberate self-destruct.
    Scuttled,
}

/// Classification of how much damage passed through armor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenetrationMode {
    /// Nothing absorbed; armor had no effect.
    #[default]
    None,
    /// Armor absorbed more than half the incoming damage.
    Partial,
    /// Armor absorbed a meaningful fraction (10-50%).
    Full,
    /// Damage passed almost untouched (<10% absorbed).
    Overpenetration,
}

/// Directional shield quadrant, in ship frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldQuadrant {
    Front,
    Rear,
    Port,
    Starboard,
}

/// One of the three ETS energy pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyPool {
    Shields,
    Weapons,
    Engines,
}

/// Discrete power transfer gestures available to the pilot or AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerTransfer {
    /// Move one level from weapons to shields.
    WeaponsToShields,
    /// Move one level from shields to weapons.
    ShieldsToWeapons,
    /// Move one level from weapons to engines.
    WeaponsToEngines,
    /// Reset all three pools to the balanced allocation.
    BalanceAll,
}

/// Ship-wide power status derived from total stored energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmergencyPowerState {
    /// Above 50% total energy.
    #[default]
    Normal,
    /// 25-50% total energy.
    LowPower,
    /// 10-25% total energy.
    CriticalPower,
    /// Below 10% total energy.
    EmergencyPower,
}
