//! Simulation constants and tuning parameters.

// --- Damage validation ---

/// Damage below this is ignored entirely (silent drop, not an error).
pub const MIN_DAMAGE_THRESHOLD: f64 = 0.01;

/// Hard cap on a single event's damage. Larger amounts are truncated
/// (with a diagnostics warning), never rejected.
pub const MAX_DAMAGE_PER_EVENT: f64 = 50_000.0;

// --- Armor ---

/// Floor for the angle-of-incidence factor. Even a fully grazing hit
/// retains 10% of its nominal pass-through.
pub const ANGLE_FACTOR_MIN: f64 = 0.1;

/// Global armor effectiveness vs EMP. Armor never blocks EMP.
pub const ARMOR_EFFECTIVENESS_EMP: f64 = 0.0;

/// Global armor effectiveness vs Ion discharge.
pub const ARMOR_EFFECTIVENESS_ION: f64 = 0.5;

/// Global armor effectiveness vs explosive damage.
pub const ARMOR_EFFECTIVENESS_EXPLOSIVE: f64 = 1.2;

/// Global armor effectiveness vs collision damage. Plating is
/// disproportionately effective against blunt kinetic impact.
pub const ARMOR_EFFECTIVENESS_COLLISION: f64 = 1.3;

/// Absorbed fraction above which a layer pass counts as Partial penetration.
pub const PENETRATION_PARTIAL_ABSORB: f64 = 0.5;

/// Absorbed fraction below which a layer pass counts as Overpenetration.
pub const PENETRATION_OVERPEN_ABSORB: f64 = 0.1;

// --- Hull ---

/// Hull percentage above which the hull is Intact.
pub const HULL_INTACT_PCT: f64 = 0.75;

/// Hull percentage above which the hull is Damaged (below Intact).
pub const HULL_DAMAGED_PCT: f64 = 0.50;

/// Hull percentage above which the hull is Critical (below Damaged).
pub const HULL_CRITICAL_PCT: f64 = 0.25;

/// Seconds between destruction trigger and final destruction.
pub const DESTRUCTION_DELAY_SECS: f64 = 2.0;

/// Fraction of max hull a single event must exceed to trigger a
/// catastrophic destruction sequence.
pub const CATASTROPHIC_DAMAGE_FRACTION: f64 = 0.5;

// --- Shields ---

/// Number of directional shield quadrants.
pub const SHIELD_QUADRANT_COUNT: usize = 4;

/// Shield points restored per second at full shield power allocation.
/// Actual recharge is gated by the energy available in the shield pool.
pub const SHIELD_RECHARGE_RATE: f64 = 12.0;

// --- Subsystems ---

/// Fraction of a damage event routed to subsystems near the impact point.
/// This is a parallel channel: it is not subtracted from hull damage.
pub const SUBSYSTEM_DAMAGE_FRACTION: f64 = 0.25;

// --- Energy Transfer System ---

/// Number of discrete power levels per pool.
pub const ETS_LEVEL_COUNT: usize = 13;

/// Maximum power level index.
pub const ETS_MAX_INDEX: u8 = 12;

/// Default (balanced) power level index for all three pools.
pub const ETS_BALANCED_INDEX: u8 = 4;

/// Authored 13-point power fraction table. Indexed by power level.
/// Values are hand-rounded twelfths; sums of any reachable allocation
/// stay within ETS_SUM_TOLERANCE of 1.0.
pub const ENERGY_LEVELS: [f64; ETS_LEVEL_COUNT] = [
    0.0, 0.0833, 0.167, 0.25, 0.333, 0.417, 0.5, 0.583, 0.667, 0.75, 0.833, 0.9167, 1.0,
];

/// Tolerance on the zero-sum allocation invariant.
pub const ETS_SUM_TOLERANCE: f64 = 0.001;

/// Total-energy fraction above which power status is Normal.
pub const POWER_NORMAL_PCT: f64 = 0.50;

/// Total-energy fraction above which power status is LowPower (below Normal).
pub const POWER_LOW_PCT: f64 = 0.25;

/// Total-energy fraction above which power status is CriticalPower
/// (below LowPower). Below this, EmergencyPower.
pub const POWER_CRITICAL_PCT: f64 = 0.10;
